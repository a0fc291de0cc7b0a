//! The action dispatcher.
//!
//! One invocation performs exactly one transition: the single action token
//! is resolved, capability-checked against the descriptor and the handler
//! table, and either reported (`info`) or handed to its handler. Every
//! failure is written once to the error stream and maps to exit status `1`.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::action_data::{CreateData, RunClientData, RunServerData, load_action_data};
use crate::capability::ModuleDescriptor;
use crate::context::ModuleContext;
use crate::error::ModuleError;
use crate::handler::{ActionHandler, Handlers};
use crate::info::{report_info, write_info};
use crate::protocol::{Action, ModuleInfo};

const DISPATCH_TARGET: &str = "cg_module::dispatch";

/// Terminal state of one invocation.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The action completed; exit status `0`.
    Success,
    /// The action failed and its message was written to the error stream;
    /// exit status `1`.
    Failure,
}

impl Outcome {
    /// Returns the numeric process exit status.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }

    /// Returns `true` for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        Self::from(outcome.exit_code())
    }
}

/// A module: its static descriptor plus the handlers it implements.
///
/// # Example
///
/// ```
/// use std::ffi::OsString;
///
/// use cg_module::{
///     Capabilities, HandlerError, Module, ModuleContext, ModuleDescriptor, Outcome,
///     RunServerData, Version,
/// };
///
/// let capabilities = Capabilities::builder()
///     .server([Version::new(0, 1, 0)])
///     .build()
///     .expect("valid capabilities");
/// let descriptor = ModuleDescriptor::new("demo", "Demo", Version::new(0, 1, 0), capabilities)
///     .expect("valid descriptor");
/// let mut module = Module::new(descriptor).with_run_server(
///     |_data: RunServerData, _context: &ModuleContext| -> Result<(), HandlerError> { Ok(()) },
/// );
///
/// let mut stdout = Vec::new();
/// let mut stderr = Vec::new();
/// let outcome = module.dispatch(
///     ["cgmod-demo", "info"].map(OsString::from),
///     &ModuleContext::default(),
///     &mut stdout,
///     &mut stderr,
/// );
/// assert_eq!(outcome, Outcome::Success);
/// assert!(stderr.is_empty());
/// ```
#[derive(Debug)]
pub struct Module<'h> {
    descriptor: ModuleDescriptor,
    handlers: Handlers<'h>,
    default_log_filter: Option<String>,
}

impl<'h> Module<'h> {
    /// Creates a module with no handlers; only `info` is supported.
    #[must_use]
    pub fn new(descriptor: ModuleDescriptor) -> Self {
        Self {
            descriptor,
            handlers: Handlers::new(),
            default_log_filter: None,
        }
    }

    /// Registers the `create` handler.
    #[must_use]
    pub fn with_create(mut self, handler: impl ActionHandler<CreateData> + 'h) -> Self {
        self.handlers = self.handlers.with_create(handler);
        self
    }

    /// Registers the `run-client` handler.
    #[must_use]
    pub fn with_run_client(mut self, handler: impl ActionHandler<RunClientData> + 'h) -> Self {
        self.handlers = self.handlers.with_run_client(handler);
        self
    }

    /// Registers the `run-server` handler.
    #[must_use]
    pub fn with_run_server(mut self, handler: impl ActionHandler<RunServerData> + 'h) -> Self {
        self.handlers = self.handlers.with_run_server(handler);
        self
    }

    /// Sets the log filter used when configuration leaves it at the default.
    #[must_use]
    pub fn with_default_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_log_filter = Some(filter.into());
        self
    }

    /// Returns the module descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    /// Returns the module's preferred default log filter, if any.
    #[must_use]
    pub fn default_log_filter(&self) -> Option<&str> {
        self.default_log_filter.as_deref()
    }

    /// Builds the capability report for this module.
    #[must_use]
    pub fn info(&self) -> ModuleInfo {
        report_info(&self.descriptor, &self.handlers)
    }

    /// Runs one invocation.
    ///
    /// `args` is the full argument vector including the program name. Any
    /// failure is written as a single line to `stderr`; `stdout` only ever
    /// carries the `info` document or handler output.
    pub fn dispatch<I>(
        &mut self,
        args: I,
        context: &ModuleContext,
        stdout: &mut impl Write,
        stderr: &mut impl Write,
    ) -> Outcome
    where
        I: IntoIterator<Item = OsString>,
    {
        match self.try_dispatch(args, context, stdout) {
            Ok(()) => Outcome::Success,
            Err(error) => {
                debug!(target: DISPATCH_TARGET, %error, "action failed");
                writeln!(stderr, "{error}").ok();
                stderr.flush().ok();
                Outcome::Failure
            }
        }
    }

    fn try_dispatch<I>(
        &mut self,
        args: I,
        context: &ModuleContext,
        stdout: &mut impl Write,
    ) -> Result<(), ModuleError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let token = self.action_token(args)?;
        let Some(action) = Action::from_token(&token) else {
            return Err(ModuleError::UnsupportedAction { action: token });
        };
        debug!(target: DISPATCH_TARGET, %action, "dispatching action");

        match action {
            Action::Info => write_info(&self.info(), stdout),
            Action::Create => self.create(context),
            Action::RunClient => {
                let handler = self
                    .handlers
                    .run_client
                    .as_deref_mut()
                    .ok_or_else(|| unsupported(action))?;
                invoke(handler, decode(context, action)?, context)
            }
            Action::RunServer => {
                let handler = self
                    .handlers
                    .run_server
                    .as_deref_mut()
                    .ok_or_else(|| unsupported(action))?;
                invoke(handler, decode(context, action)?, context)
            }
        }
    }

    fn action_token<I>(&self, args: I) -> Result<String, ModuleError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut argv = args.into_iter();
        let program = argv.next();
        let token = argv.next();
        let rest = argv.next();
        match (token, rest) {
            (Some(action), None) => Ok(action.to_string_lossy().into_owned()),
            _ => Err(ModuleError::Usage {
                program: program.map_or_else(
                    || self.descriptor.name().to_owned(),
                    |name| name.to_string_lossy().into_owned(),
                ),
            }),
        }
    }

    fn create(&mut self, context: &ModuleContext) -> Result<(), ModuleError> {
        let capabilities = self.descriptor.capabilities();
        let handler = self
            .handlers
            .create
            .as_deref_mut()
            .ok_or_else(|| unsupported(Action::Create))?;
        let data: CreateData = decode(context, Action::Create)?;

        let project_type = data.project_type();
        let versions = capabilities
            .versions_for(project_type)
            .ok_or(ModuleError::UnsupportedProjectType { project_type })?;

        let request = match data.library_version() {
            Some(version) if versions.contains(&version) => data,
            Some(version) => {
                return Err(ModuleError::UnsupportedLibraryVersion {
                    project_type,
                    version,
                });
            }
            None => match versions.last() {
                Some(latest) => data.with_library_version(*latest),
                None => data,
            },
        };
        invoke(handler, request, context)
    }
}

fn unsupported(action: Action) -> ModuleError {
    ModuleError::UnsupportedAction {
        action: action.as_str().to_owned(),
    }
}

fn decode<T: DeserializeOwned>(context: &ModuleContext, action: Action) -> Result<T, ModuleError> {
    load_action_data(context.config(), action).map_err(ModuleError::from)
}

fn invoke<D, H>(handler: &mut H, data: D, context: &ModuleContext) -> Result<(), ModuleError>
where
    H: ActionHandler<D> + ?Sized,
{
    handler.handle(data, context).map_err(ModuleError::Handler)
}

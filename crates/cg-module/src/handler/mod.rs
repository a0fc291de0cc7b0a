//! Action handlers and the capability-checked dispatch table.
//!
//! [`Handlers`] maps each non-`info` [`Action`] to an optional handler. The
//! table is the single source of truth for "is this action implemented", so
//! the `info` report and the dispatcher can never disagree.

use crate::action_data::{CreateData, RunClientData, RunServerData};
use crate::context::ModuleContext;
use crate::error::HandlerError;
use crate::protocol::Action;

/// Business logic for one action.
///
/// Closures with the matching signature implement this trait, so simple
/// modules can register handlers inline.
///
/// # Example
///
/// ```
/// use cg_module::{ActionHandler, HandlerError, ModuleContext, RunServerData};
///
/// struct Announce;
///
/// impl ActionHandler<RunServerData> for Announce {
///     fn handle(
///         &mut self,
///         data: RunServerData,
///         _context: &ModuleContext,
///     ) -> Result<(), HandlerError> {
///         if data.port() == Some(0) {
///             return Err("port 0 is reserved".into());
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait ActionHandler<D> {
    /// Performs the action with its decoded payload.
    ///
    /// # Errors
    ///
    /// Any error is reported verbatim on standard error and ends the process
    /// with exit status `1`.
    fn handle(&mut self, data: D, context: &ModuleContext) -> Result<(), HandlerError>;
}

impl<D, F> ActionHandler<D> for F
where
    F: FnMut(D, &ModuleContext) -> Result<(), HandlerError>,
{
    fn handle(&mut self, data: D, context: &ModuleContext) -> Result<(), HandlerError> {
        self(data, context)
    }
}

type BoxedHandler<'h, D> = Box<dyn ActionHandler<D> + 'h>;

/// Dispatch table from action to optional handler.
#[derive(Default)]
pub struct Handlers<'h> {
    pub(crate) create: Option<BoxedHandler<'h, CreateData>>,
    pub(crate) run_client: Option<BoxedHandler<'h, RunClientData>>,
    pub(crate) run_server: Option<BoxedHandler<'h, RunServerData>>,
}

impl<'h> Handlers<'h> {
    /// Creates a table with no handlers; only `info` is supported.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the `create` handler.
    #[must_use]
    pub fn with_create(mut self, handler: impl ActionHandler<CreateData> + 'h) -> Self {
        self.create = Some(Box::new(handler));
        self
    }

    /// Registers the `run-client` handler.
    #[must_use]
    pub fn with_run_client(mut self, handler: impl ActionHandler<RunClientData> + 'h) -> Self {
        self.run_client = Some(Box::new(handler));
        self
    }

    /// Registers the `run-server` handler.
    #[must_use]
    pub fn with_run_server(mut self, handler: impl ActionHandler<RunServerData> + 'h) -> Self {
        self.run_server = Some(Box::new(handler));
        self
    }

    /// Returns `true` when `action` can be dispatched. `info` is always
    /// supported.
    #[must_use]
    pub const fn supports(&self, action: Action) -> bool {
        match action {
            Action::Info => true,
            Action::Create => self.create.is_some(),
            Action::RunClient => self.run_client.is_some(),
            Action::RunServer => self.run_server.is_some(),
        }
    }

    /// Returns the implemented actions in reporting order.
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|action| self.supports(*action))
            .collect()
    }
}

impl std::fmt::Debug for Handlers<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handlers")
            .field("actions", &self.actions())
            .finish()
    }
}

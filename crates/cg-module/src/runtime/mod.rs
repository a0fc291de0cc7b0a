//! Process entry point shared by every module binary.

use std::env;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use cg_module_config::{Config, DEFAULT_LOG_FILTER};
use ortho_config::{OrthoConfig, OrthoError};
use tracing::debug;

use crate::context::ModuleContext;
use crate::dispatch::{Module, Outcome};
use crate::error::ModuleError;
use crate::telemetry;

const RUNTIME_TARGET: &str = "cg_module::runtime";

/// Source of the invocation's configuration.
pub trait ConfigLoader {
    /// Loads configuration for the program named `program`.
    ///
    /// # Errors
    ///
    /// Returns the layered configuration error when any source is malformed.
    fn load(&self, program: &OsStr) -> Result<Config, Arc<OrthoError>>;
}

/// Loads configuration from defaults, the configuration file and the
/// `CG_MODULE_*` environment.
///
/// The argument vector carries only the action token, so the program name is
/// the sole command-line input handed to `ortho_config`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, program: &OsStr) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter([program.to_os_string()])
    }
}

/// Runs `module` against the real process environment and streams.
///
/// Intended to be returned straight from `main`:
///
/// ```no_run
/// use std::process::ExitCode;
///
/// use cg_module::{Capabilities, Module, ModuleDescriptor, Version};
///
/// fn main() -> ExitCode {
///     let capabilities = Capabilities::builder()
///         .server([Version::new(0, 1, 0)])
///         .build()
///         .expect("valid capabilities");
///     let descriptor =
///         ModuleDescriptor::new("demo", "Demo", Version::new(0, 1, 0), capabilities)
///             .expect("valid descriptor");
///     cg_module::run(Module::new(descriptor))
/// }
/// ```
#[must_use]
pub fn run(mut module: Module<'_>) -> ExitCode {
    let stdout = io::stdout();
    let stderr = io::stderr();
    run_with(
        &mut module,
        env::args_os(),
        &OrthoConfigLoader,
        &mut stdout.lock(),
        &mut stderr.lock(),
    )
    .into()
}

/// Runs one invocation with explicit arguments, configuration source and
/// streams.
///
/// Configuration or telemetry failures are reported on `stderr` and yield
/// [`Outcome::Failure`] without dispatching.
pub fn run_with<I>(
    module: &mut Module<'_>,
    args: I,
    loader: &impl ConfigLoader,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> Outcome
where
    I: IntoIterator<Item = OsString>,
{
    let argv: Vec<OsString> = args.into_iter().collect();
    let program = argv
        .first()
        .cloned()
        .unwrap_or_else(|| OsString::from(module.descriptor().name()));

    let config = match prepare_config(module, loader, &program) {
        Ok(config) => config,
        Err(error) => return report(stderr, &error),
    };
    let _telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(error) => return report(stderr, &ModuleError::from(error)),
    };
    debug!(
        target: RUNTIME_TARGET,
        module = module.descriptor().name(),
        args = argv.len(),
        "module invoked"
    );

    let context = ModuleContext::new(config);
    module.dispatch(argv, &context, stdout, stderr)
}

fn prepare_config(
    module: &Module<'_>,
    loader: &impl ConfigLoader,
    program: &OsStr,
) -> Result<Config, ModuleError> {
    let mut config = loader.load(program).map_err(ModuleError::LoadConfiguration)?;
    if let Some(filter) = module.default_log_filter()
        && config.log_filter == DEFAULT_LOG_FILTER
    {
        filter.clone_into(&mut config.log_filter);
    }
    Ok(config)
}

fn report(stderr: &mut impl Write, error: &ModuleError) -> Outcome {
    writeln!(stderr, "{error}").ok();
    stderr.flush().ok();
    Outcome::Failure
}

#[cfg(test)]
mod tests;

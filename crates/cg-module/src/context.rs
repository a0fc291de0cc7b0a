//! Per-invocation context handed to the dispatcher and every handler.

use cg_module_config::Config;

/// Explicit state for one module invocation.
///
/// The context replaces process-wide setup: tests build one directly from a
/// [`Config`] and dispatch without touching globals.
#[derive(Debug, Clone, Default)]
pub struct ModuleContext {
    config: Config,
}

impl ModuleContext {
    /// Creates a context around a resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

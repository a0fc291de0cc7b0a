//! Action protocol shared by CodeGame language modules.
//!
//! A language module is a short-lived process spawned by the CodeGame
//! orchestrator with exactly one action token: `info`, `create`,
//! `run-client` or `run-server`. The module reports its capabilities, reads
//! the payload prepared for the action, validates the request against its
//! declared capabilities and hands it to the module's own handler. Success is
//! exit status `0` with nothing on standard error; every failure is a single
//! message on standard error and exit status `1`.
//!
//! # Architecture
//!
//! A module is described by a [`ModuleDescriptor`] (name, version and
//! [`Capabilities`]) and a set of [`ActionHandler`]s registered on a
//! [`Module`]. [`Module::dispatch`] performs one invocation against explicit
//! streams and an explicit [`ModuleContext`], which is what the tests drive.
//! [`run`] wires the same dispatcher to the real process: it loads the
//! layered configuration, installs scoped telemetry on standard error and
//! returns the process [`ExitCode`](std::process::ExitCode).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::process::ExitCode;
//!
//! use cg_module::{
//!     Capabilities, CreateData, HandlerError, Module, ModuleContext, ModuleDescriptor, Version,
//! };
//!
//! fn create(data: CreateData, _context: &ModuleContext) -> Result<(), HandlerError> {
//!     std::fs::create_dir_all(data.project_directory())?;
//!     Ok(())
//! }
//!
//! fn main() -> ExitCode {
//!     let capabilities = Capabilities::builder()
//!         .client([Version::new(0, 9, 0)])
//!         .build()
//!         .expect("valid capabilities");
//!     let descriptor = ModuleDescriptor::new("go", "Go", Version::new(0, 3, 1), capabilities)
//!         .expect("valid descriptor");
//!     cg_module::run(Module::new(descriptor).with_create(create))
//! }
//! ```

pub mod action_data;
pub mod capability;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod info;
pub mod protocol;
pub mod runtime;
pub mod telemetry;
pub mod version;

#[cfg(test)]
mod tests;

pub use self::action_data::{CreateData, RunClientData, RunServerData, load_action_data};
pub use self::capability::{Capabilities, CapabilitiesBuilder, ModuleDescriptor};
pub use self::context::ModuleContext;
pub use self::dispatch::{Module, Outcome};
pub use self::error::{ActionDataError, DescriptorError, HandlerError, ModuleError};
pub use self::handler::{ActionHandler, Handlers};
pub use self::info::{report_info, write_info};
pub use self::protocol::{
    Action, Diagnostic, DiagnosticSeverity, LibraryVersions, ModuleInfo, PROTOCOL_VERSION,
    ProjectType,
};
pub use self::runtime::{ConfigLoader, OrthoConfigLoader, run, run_with};
pub use self::version::{Version, VersionParseError};

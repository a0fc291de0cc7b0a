//! Domain errors raised by the module protocol.
//!
//! Every failure collapses to exit status `1`; the variant only decides the
//! message written to standard error. I/O errors are wrapped in `Arc` to
//! satisfy the `result_large_err` Clippy lint.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::protocol::{Action, ProjectType};
use crate::telemetry::TelemetryError;
use crate::version::Version;

/// Opaque failure produced by a module's own action handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that terminate a module invocation.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The process received the wrong number of arguments.
    #[error("USAGE: {program} <action>")]
    Usage {
        /// Program name used in the usage line.
        program: String,
    },

    /// The action token is unknown or this module has no handler for it.
    #[error("unsupported action '{action}'")]
    UnsupportedAction {
        /// The requested action token.
        action: String,
    },

    /// `create` targeted a project type missing from the capability registry.
    #[error("unsupported project type '{project_type}'")]
    UnsupportedProjectType {
        /// The requested project type.
        project_type: ProjectType,
    },

    /// `create` pinned a library version the module does not declare.
    #[error("unsupported {project_type} library version '{version}'")]
    UnsupportedLibraryVersion {
        /// The requested project type.
        project_type: ProjectType,
        /// The requested library version.
        version: Version,
    },

    /// The action payload could not be obtained or decoded.
    #[error(transparent)]
    ActionData(#[from] ActionDataError),

    /// The module info document could not be serialised.
    #[error("failed to serialise module info: {0}")]
    SerializeInfo(#[source] serde_json::Error),

    /// Writing protocol output failed.
    #[error("failed to write {what}: {source}")]
    Io {
        /// Description of the output being written.
        what: &'static str,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Layered configuration could not be loaded.
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(#[source] Arc<ortho_config::OrthoError>),

    /// The logging subscriber could not be configured.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The action handler reported a failure.
    #[error("{0}")]
    Handler(#[source] HandlerError),
}

/// Errors raised while acquiring the payload for an action.
#[derive(Debug, Error)]
pub enum ActionDataError {
    /// Neither an inline payload nor a payload file was configured.
    #[error("no action data was provided for '{action}'")]
    Missing {
        /// The action awaiting data.
        action: Action,
    },

    /// The configured payload file could not be read.
    #[error("failed to read action data from '{}': {source}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The payload was not valid JSON for the action.
    #[error("invalid action data for '{action}': {source}")]
    Decode {
        /// The action whose payload failed to decode.
        action: Action,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while declaring a module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// A project type was declared without any library versions.
    #[error("project type '{project_type}' must declare at least one library version")]
    EmptyVersionSet {
        /// The offending project type.
        project_type: ProjectType,
    },

    /// The module name was blank.
    #[error("module name must not be empty")]
    EmptyName,
}

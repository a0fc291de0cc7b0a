//! Errors raised while resolving a CGE game schema.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cg_module::{Diagnostic, Version};
use thiserror::Error;

/// Errors that prevent a usable game definition from being produced.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The locator could not be interpreted or its scheme is not supported.
    #[error("failed to fetch '{locator}': {message}")]
    Fetch {
        /// The game locator as given.
        locator: String,
        /// Description of the failure.
        message: String,
    },

    /// Reading the document failed.
    #[error("failed to fetch '{locator}': {source}")]
    FetchIo {
        /// The game locator as given.
        locator: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The game server answered with a non-success status.
    #[error("failed to fetch '{locator}': server responded with status {status}")]
    HttpStatus {
        /// The game locator as given.
        locator: String,
        /// HTTP status code.
        status: u16,
    },

    /// The document header lacks valid `name`/`cge` directives.
    #[error("invalid CGE metadata: {}", join_diagnostics(diagnostics))]
    Metadata {
        /// Error diagnostics describing the problems.
        diagnostics: Vec<Diagnostic>,
    },

    /// No installed parser understands the declared CGE version.
    #[error("unsupported CGE version '{version}'")]
    UnsupportedSchemaVersion {
        /// Version declared by the document.
        version: Version,
    },

    /// The parser reported error diagnostics.
    #[error("failed to parse CGE document: {}", join_diagnostics(diagnostics))]
    SchemaParse {
        /// Every error-severity diagnostic, in source order.
        diagnostics: Vec<Diagnostic>,
    },

    /// The parser directory could not be scanned.
    #[error("failed to scan parser directory '{}': {source}", path.display())]
    ParserDirectory {
        /// Directory being scanned.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The parser executable could not be started.
    #[error("failed to start CGE parser '{}': {source}", executable.display())]
    ParserSpawn {
        /// Parser executable.
        executable: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Communication with the parser process failed.
    #[error("I/O error talking to CGE parser '{}': {source}", executable.display())]
    ParserIo {
        /// Parser executable.
        executable: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The parser exited unsuccessfully.
    #[error("CGE parser '{}' exited with status {status}", executable.display())]
    ParserExit {
        /// Parser executable.
        executable: PathBuf,
        /// Exit status, or `-1` when killed by a signal.
        status: i32,
    },

    /// The parser exceeded its time budget and was killed.
    #[error("CGE parser '{}' timed out after {timeout:?}", executable.display())]
    ParserTimeout {
        /// Parser executable.
        executable: PathBuf,
        /// Configured timeout.
        timeout: Duration,
    },

    /// The parser output was not a valid response document.
    #[error("CGE parser '{}' produced invalid output: {message}", executable.display())]
    ParserOutput {
        /// Parser executable.
        executable: PathBuf,
        /// Description of the problem.
        message: String,
    },
}

impl SchemaError {
    /// Returns the diagnostics carried by the error, if any.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Metadata { diagnostics } | Self::SchemaParse { diagnostics } => diagnostics,
            _ => &[],
        }
    }
}

fn join_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

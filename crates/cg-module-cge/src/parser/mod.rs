//! Versioned CGE parsers and the registry that selects between them.
//!
//! Each installed parser understands exactly one CGE language version. The
//! registry picks the newest parser compatible with the version a document
//! declares, so a `0.5.x` document is handled by the newest `0.5` parser and
//! a `1.x` document by the newest `1.y` parser.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cg_module::{Diagnostic, Version};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::definition::GameDefinition;
use crate::error::SchemaError;
use crate::process::ProcessParser;

const PARSER_TARGET: &str = "cg_module_cge::parser";

/// File name prefix of installed parser executables.
pub const PARSER_PREFIX: &str = "cge-parser-";

/// Options forwarded to a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    include_comments: bool,
}

impl ParseOptions {
    /// Creates options.
    #[must_use]
    pub const fn new(include_comments: bool) -> Self {
        Self { include_comments }
    }

    /// Returns `true` when doc comments should be kept.
    #[must_use]
    pub const fn include_comments(&self) -> bool {
        self.include_comments
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new(true)
    }
}

/// What a parser reports for one document.
///
/// A definition is only meaningful when no diagnostic has error severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    definition: Option<GameDefinition>,
    #[serde(default)]
    diagnostics: Vec<Diagnostic>,
}

impl ParserOutput {
    /// Creates an output from its parts.
    #[must_use]
    pub const fn new(definition: Option<GameDefinition>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            definition,
            diagnostics,
        }
    }

    /// Returns the parsed definition, if any.
    #[must_use]
    pub const fn definition(&self) -> Option<&GameDefinition> {
        self.definition.as_ref()
    }

    /// Returns every diagnostic in the order reported.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Splits the output into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Option<GameDefinition>, Vec<Diagnostic>) {
        (self.definition, self.diagnostics)
    }
}

/// A parser for one CGE language version.
#[cfg_attr(test, mockall::automock)]
pub trait CgeParser {
    /// Parses a complete document.
    ///
    /// Problems in the document are reported as diagnostics in the output;
    /// an `Err` means the parser itself could not run.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the parser fails to execute.
    fn parse(&self, document: &str, options: ParseOptions) -> Result<ParserOutput, SchemaError>;
}

/// Installed parsers keyed by the CGE version they implement.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: BTreeMap<Version, Box<dyn CgeParser>>,
}

impl ParserRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `parser` for `version`, replacing any previous entry.
    pub fn register(&mut self, version: Version, parser: impl CgeParser + 'static) {
        self.parsers.insert(version, Box::new(parser));
    }

    /// Returns the registered versions in ascending order.
    #[must_use]
    pub fn versions(&self) -> Vec<Version> {
        self.parsers.keys().copied().collect()
    }

    /// Returns `true` when no parser is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Selects the newest parser compatible with `declared`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedSchemaVersion`] when no registered
    /// parser is compatible.
    pub fn select(&self, declared: Version) -> Result<(Version, &dyn CgeParser), SchemaError> {
        self.parsers
            .iter()
            .rev()
            .find(|(version, _)| version.is_compatible_with(&declared))
            .map(|(version, parser)| (*version, parser.as_ref()))
            .ok_or(SchemaError::UnsupportedSchemaVersion { version: declared })
    }

    /// Builds a registry from the `cge-parser-<version>` executables in
    /// `directory`. A missing directory yields an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ParserDirectory`] if the directory exists but
    /// cannot be read.
    pub fn discover(directory: &Path, timeout: Duration) -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        let entries = match std::fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    target: PARSER_TARGET,
                    directory = %directory.display(),
                    "parser directory does not exist"
                );
                return Ok(registry);
            }
            Err(error) => return Err(directory_error(directory, error)),
        };

        for entry in entries {
            let path = entry.map_err(|error| directory_error(directory, error))?.path();
            let Some(version) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(parser_version)
            else {
                continue;
            };
            if !path.is_file() {
                continue;
            }
            debug!(
                target: PARSER_TARGET,
                %version,
                executable = %path.display(),
                "discovered CGE parser"
            );
            registry.register(version, ProcessParser::new(path, timeout));
        }
        Ok(registry)
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("versions", &self.versions())
            .finish()
    }
}

/// Extracts the version from a parser executable name such as
/// `cge-parser-0.5.2` or `cge-parser-v0.5.2.exe`.
fn parser_version(file_name: &str) -> Option<Version> {
    let rest = file_name.strip_prefix(PARSER_PREFIX)?;
    let version = rest.strip_suffix(".exe").unwrap_or(rest);
    version.parse().ok()
}

fn directory_error(directory: &Path, source: std::io::Error) -> SchemaError {
    SchemaError::ParserDirectory {
        path: directory.to_path_buf(),
        source: Arc::new(source),
    }
}

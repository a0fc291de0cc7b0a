//! Game schema resolution: fetch, read metadata, select a parser, parse.
//!
//! A resolution either yields a complete [`GameDefinition`] together with
//! any warnings, or fails. Error diagnostics are logged one by one and then
//! returned together as [`SchemaError::SchemaParse`]; a definition is never
//! returned alongside them.

use std::time::Duration;

use cg_module::{Diagnostic, Version};
use cg_module_config::Config;
use tracing::{debug, error, warn};

use crate::definition::GameDefinition;
use crate::error::SchemaError;
use crate::fetch::{DefaultFetcher, DocumentFetcher, Locator};
use crate::metadata::{Metadata, parse_metadata};
use crate::parser::{ParseOptions, ParserRegistry};

const RESOLVER_TARGET: &str = "cg_module_cge::resolver";

/// A successfully resolved game schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    metadata: Metadata,
    parser_version: Version,
    definition: GameDefinition,
    warnings: Vec<Diagnostic>,
}

impl Resolution {
    /// Returns the document header.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the version of the parser that handled the document.
    #[must_use]
    pub const fn parser_version(&self) -> Version {
        self.parser_version
    }

    /// Returns the parsed definition.
    #[must_use]
    pub const fn definition(&self) -> &GameDefinition {
        &self.definition
    }

    /// Returns non-fatal diagnostics reported by the parser.
    #[must_use]
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Consumes the resolution, returning the definition.
    #[must_use]
    pub fn into_definition(self) -> GameDefinition {
        self.definition
    }
}

/// Resolves game locators into parsed definitions.
#[derive(Debug)]
pub struct SchemaResolver<F> {
    fetcher: F,
    registry: ParserRegistry,
    options: ParseOptions,
}

impl SchemaResolver<DefaultFetcher> {
    /// Builds a resolver from the invocation configuration: parsers are
    /// discovered in `parser_dir` and documents fetched with
    /// `fetch_timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ParserDirectory`] if the parser directory
    /// cannot be scanned.
    pub fn from_config(config: &Config) -> Result<Self, SchemaError> {
        let registry = ParserRegistry::discover(
            config.parser_dir().as_std_path(),
            Duration::from_secs(config.parser_timeout_secs),
        )?;
        debug!(
            target: RESOLVER_TARGET,
            parser_dir = %config.parser_dir(),
            versions = ?registry.versions(),
            "parser registry ready"
        );
        Ok(Self::new(
            DefaultFetcher::new(Duration::from_secs(config.fetch_timeout_secs)),
            registry,
            ParseOptions::new(config.include_comments()),
        ))
    }
}

impl<F: DocumentFetcher> SchemaResolver<F> {
    /// Creates a resolver from explicit collaborators.
    #[must_use]
    pub const fn new(fetcher: F, registry: ParserRegistry, options: ParseOptions) -> Self {
        Self {
            fetcher,
            registry,
            options,
        }
    }

    /// Returns the parser registry.
    #[must_use]
    pub const fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Fetches and parses the game schema named by `locator`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when the document cannot be fetched, its
    /// metadata is invalid, no compatible parser is installed, the parser
    /// fails to run or it reports error diagnostics.
    pub fn resolve(&self, locator: &str) -> Result<Resolution, SchemaError> {
        let parsed = Locator::parse(locator)?;
        let document = self.fetcher.fetch(&parsed)?;
        let metadata = parse_metadata(&document).inspect_err(log_diagnostics)?;
        let (parser_version, parser) = self.registry.select(metadata.cge_version())?;
        debug!(
            target: RESOLVER_TARGET,
            game = metadata.name(),
            declared = %metadata.cge_version(),
            parser = %parser_version,
            "parsing CGE document"
        );

        let (definition, diagnostics) = parser.parse(&document, self.options)?.into_parts();
        let (errors, warnings): (Vec<_>, Vec<_>) =
            diagnostics.into_iter().partition(Diagnostic::is_error);
        if !errors.is_empty() {
            let failure = SchemaError::SchemaParse {
                diagnostics: errors,
            };
            log_diagnostics(&failure);
            return Err(failure);
        }
        let Some(mut definition) = definition else {
            return Err(SchemaError::SchemaParse {
                diagnostics: vec![Diagnostic::error("parser returned no game definition")],
            });
        };
        if !self.options.include_comments() {
            definition.strip_comments();
        }
        for warning in &warnings {
            warn!(target: RESOLVER_TARGET, "CGE: {warning}");
        }

        Ok(Resolution {
            metadata,
            parser_version,
            definition,
            warnings,
        })
    }
}

fn log_diagnostics(failure: &SchemaError) {
    for diagnostic in failure.diagnostics() {
        error!(target: RESOLVER_TARGET, "CGE: {diagnostic}");
    }
}

//! CGE game schema resolution for CodeGame language modules.
//!
//! `create` handlers need the game's schema before they can generate code.
//! [`SchemaResolver::resolve`] fetches the CGE document for a game locator,
//! reads its `name`/`cge` header, selects the newest installed parser that is
//! compatible with the declared language version and runs it. Parsers are
//! external executables named `cge-parser-<version>` in the configured parser
//! directory; each speaks a single JSON response on stdout.
//!
//! # Example
//!
//! ```rust,no_run
//! use cg_module_cge::SchemaResolver;
//! use cg_module_config::Config;
//!
//! # fn main() -> Result<(), cg_module_cge::SchemaError> {
//! let resolver = SchemaResolver::from_config(&Config::default())?;
//! let resolution = resolver.resolve("games.example.com:8080")?;
//! assert_eq!(resolution.metadata().name(), resolution.definition().name());
//! # Ok(())
//! # }
//! ```

pub mod definition;
pub mod error;
pub mod fetch;
pub mod metadata;
pub mod parser;
pub mod process;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use self::definition::{
    EnumDefinition, EnumValue, GameDefinition, ObjectDefinition, Property, PropertyType,
};
pub use self::error::SchemaError;
pub use self::fetch::{CGE_ENDPOINT, DefaultFetcher, DocumentFetcher, Locator};
pub use self::metadata::{Metadata, parse_metadata};
pub use self::parser::{CgeParser, PARSER_PREFIX, ParseOptions, ParserOutput, ParserRegistry};
pub use self::process::ProcessParser;
pub use self::resolver::{Resolution, SchemaResolver};

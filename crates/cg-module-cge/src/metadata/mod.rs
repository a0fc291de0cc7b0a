//! Extraction of the `name`/`cge` header from a CGE document.
//!
//! The header is the run of directive lines at the top of the document.
//! Blank lines and `//` comments may be interleaved; the first other line
//! ends the header.

use cg_module::{Diagnostic, Version};

use crate::error::SchemaError;

/// Identity and language version declared by a CGE document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    name: String,
    cge_version: Version,
}

impl Metadata {
    /// Creates metadata from its parts.
    #[must_use]
    pub fn new(name: impl Into<String>, cge_version: Version) -> Self {
        Self {
            name: name.into(),
            cge_version,
        }
    }

    /// Returns the game name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the declared CGE language version.
    #[must_use]
    pub const fn cge_version(&self) -> Version {
        self.cge_version
    }
}

/// Reads the metadata header of `document`.
///
/// # Errors
///
/// Returns [`SchemaError::Metadata`] with one diagnostic per problem when a
/// directive is missing, repeated or malformed.
///
/// # Example
///
/// ```
/// use cg_module::Version;
/// use cg_module_cge::parse_metadata;
///
/// let metadata = parse_metadata("// chess\nname chess\ncge v0.5\n\nconfig {}\n")
///     .expect("valid header");
/// assert_eq!(metadata.name(), "chess");
/// assert_eq!(metadata.cge_version(), Version::new(0, 5, 0));
/// ```
pub fn parse_metadata(document: &str) -> Result<Metadata, SchemaError> {
    let mut name = None;
    let mut version = None;
    let mut saw_name = false;
    let mut saw_cge = false;
    let mut diagnostics = Vec::new();

    for (index, raw) in document.lines().enumerate() {
        let line_number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let value = rest.trim();
        match keyword {
            "name" => {
                if std::mem::replace(&mut saw_name, true) {
                    diagnostics.push(at(line_number, "duplicate 'name' directive"));
                } else if is_identifier(value) {
                    name = Some(value.to_owned());
                } else {
                    diagnostics.push(at(
                        line_number,
                        format!("invalid game name '{value}'"),
                    ));
                }
            }
            "cge" => {
                if std::mem::replace(&mut saw_cge, true) {
                    diagnostics.push(at(line_number, "duplicate 'cge' directive"));
                } else {
                    match value.parse::<Version>() {
                        Ok(parsed) => version = Some(parsed),
                        Err(error) => diagnostics.push(at(
                            line_number,
                            format!("invalid CGE version '{value}': {error}"),
                        )),
                    }
                }
            }
            _ => break,
        }
    }

    if !saw_name {
        diagnostics.push(Diagnostic::error("missing 'name' directive"));
    }
    if !saw_cge {
        diagnostics.push(Diagnostic::error("missing 'cge' directive"));
    }
    match (name, version) {
        (Some(game_name), Some(cge_version)) if diagnostics.is_empty() => {
            Ok(Metadata::new(game_name, cge_version))
        }
        _ => Err(SchemaError::Metadata { diagnostics }),
    }
}

fn at(line: u32, message: impl Into<String>) -> Diagnostic {
    Diagnostic::error(message).at(line, 1)
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-'))
}

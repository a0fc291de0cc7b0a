//! Semantic versions for modules, client/server libraries and CGE documents.
//!
//! Versions are written as `major.minor.patch`. Parsing accepts a leading
//! `v` and omitted trailing components (`0.5` is `0.5.0`), matching the
//! forms found in CGE headers and parser executable names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A `major.minor.patch` version triple.
///
/// # Example
///
/// ```
/// use cg_module::Version;
///
/// let version: Version = "v0.5".parse().expect("valid version");
/// assert_eq!(version, Version::new(0, 5, 0));
/// assert_eq!(version.to_string(), "0.5.0");
/// assert!(version.is_compatible_with(&Version::new(0, 5, 3)));
/// assert!(!version.is_compatible_with(&Version::new(0, 6, 0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u16,
    minor: u16,
    patch: u16,
}

impl Version {
    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns the major component.
    #[must_use]
    pub const fn major(self) -> u16 {
        self.major
    }

    /// Returns the minor component.
    #[must_use]
    pub const fn minor(self) -> u16 {
        self.minor
    }

    /// Returns the patch component.
    #[must_use]
    pub const fn patch(self) -> u16 {
        self.patch
    }

    /// Returns `true` if `other` can be served by an implementation of
    /// `self`.
    ///
    /// Versions are compatible when they share a major component. Below
    /// `1.0.0` every minor release may break, so the minor component must
    /// match as well.
    #[must_use]
    pub const fn is_compatible_with(self, other: &Self) -> bool {
        if self.major != other.major {
            return false;
        }
        self.major != 0 || self.minor == other.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Errors produced when parsing a [`Version`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    /// The input was empty.
    #[error("version string is empty")]
    Empty,
    /// The input had more than three components.
    #[error("version '{0}' has more than three components")]
    TooManyComponents(String),
    /// A component was not a non-negative integer.
    #[error("version '{input}' has an invalid component '{component}'")]
    InvalidComponent {
        /// Full input text.
        input: String,
        /// Offending component.
        component: String,
    },
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let mut components = [0_u16; 3];
        let mut count = 0_usize;
        for part in digits.split('.') {
            let slot = components
                .get_mut(count)
                .ok_or_else(|| VersionParseError::TooManyComponents(trimmed.to_owned()))?;
            *slot = part
                .parse::<u16>()
                .map_err(|_| VersionParseError::InvalidComponent {
                    input: trimmed.to_owned(),
                    component: part.to_owned(),
                })?;
            count += 1;
        }

        let [major, minor, patch] = components;
        Ok(Self::new(major, minor, patch))
    }
}

impl TryFrom<String> for Version {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

#[cfg(test)]
mod tests;

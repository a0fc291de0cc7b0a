//! Layered configuration shared by CodeGame language modules.
//!
//! A module process receives exactly one positional argument, the action
//! token, so configuration never arrives through the command line. Values are
//! merged from built-in defaults, an optional configuration file
//! (`CG_MODULE_CONFIG_PATH`) and `CG_MODULE_*` environment variables using
//! `ortho_config`.

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_INCLUDE_COMMENTS, DEFAULT_LOG_FILTER,
    DEFAULT_PARSER_TIMEOUT_SECS, default_log_filter, default_log_filter_string,
    default_log_format, default_parser_dir,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for a single module invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "CG_MODULE")]
pub struct Config {
    /// `tracing` filter directive applied to the stderr subscriber.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Inline JSON payload describing the requested action.
    pub action_data: Option<String>,
    /// File holding the JSON action payload; preferred over `action_data`.
    pub action_data_path: Option<Utf8PathBuf>,
    /// Directory scanned for versioned CGE parser executables.
    #[ortho_config(default = default_parser_dir())]
    pub parser_dir: Utf8PathBuf,
    /// Upper bound on the runtime of a CGE parser process.
    #[ortho_config(default = DEFAULT_PARSER_TIMEOUT_SECS)]
    pub parser_timeout_secs: u64,
    /// Upper bound on connecting to and reading from a game server.
    #[ortho_config(default = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,
    /// Whether parsed game definitions retain doc comments; unset means
    /// they do. Read through [`Config::include_comments`].
    pub include_comments: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            action_data: None,
            action_data_path: None,
            parser_dir: default_parser_dir(),
            parser_timeout_secs: DEFAULT_PARSER_TIMEOUT_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            include_comments: None,
        }
    }
}

impl Config {
    /// Filter directive for the telemetry subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Configured log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Whether parsed game definitions retain doc comments.
    #[must_use]
    pub const fn include_comments(&self) -> bool {
        match self.include_comments {
            Some(value) => value,
            None => DEFAULT_INCLUDE_COMMENTS,
        }
    }

    /// Directory holding versioned CGE parser executables.
    #[must_use]
    pub fn parser_dir(&self) -> &Utf8Path {
        self.parser_dir.as_path()
    }
}

use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Default log filter expression used by module binaries.
///
/// Kept at `warn` so a successful invocation leaves standard error empty.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default timeout applied to a CGE parser process.
pub const DEFAULT_PARSER_TIMEOUT_SECS: u64 = 30;

/// Default timeout applied to fetching a CGE document.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Parsed game definitions keep doc comments unless configured otherwise.
pub const DEFAULT_INCLUDE_COMMENTS: bool = true;

/// Default log filter expression used by module binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for module binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Directory holding the installed `cge-parser-<version>` executables.
///
/// Resolves to `<data dir>/codegame/bin/cge-parser`, falling back to a path
/// relative to the working directory when the platform has no data directory.
#[must_use]
pub fn default_parser_dir() -> Utf8PathBuf {
    let mut base = dirs::data_dir()
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
        .unwrap_or_else(|| Utf8PathBuf::from(".codegame"));
    base.push("codegame");
    base.push("bin");
    base.push("cge-parser");
    base
}

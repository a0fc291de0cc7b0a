use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Shape of the records written to standard error.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by the orchestrator's log sink.
    Json,
    /// Human-readable single line output.
    #[default]
    Compact,
}

/// Error returned when `CG_MODULE_LOG_FORMAT` names an unknown format.
pub type LogFormatParseError = strum::ParseError;

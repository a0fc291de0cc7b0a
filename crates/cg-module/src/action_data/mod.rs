//! Payloads handed to action handlers.
//!
//! The orchestrator prepares the payload before spawning the module and
//! passes it either inline (`CG_MODULE_ACTION_DATA`) or through a file
//! (`CG_MODULE_ACTION_DATA_PATH`). The file wins when both are present. The
//! payload is decoded in full before any handler runs and ownership moves to
//! the handler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cg_module_config::Config;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ActionDataError;
use crate::protocol::{Action, ProjectType};
use crate::version::Version;

const ACTION_DATA_TARGET: &str = "cg_module::action_data";

fn current_directory() -> PathBuf {
    PathBuf::from(".")
}

/// Parameters for scaffolding a new project.
///
/// # Example
///
/// ```
/// use cg_module::{CreateData, ProjectType};
///
/// let data: CreateData = serde_json::from_str(
///     r#"{"project_type":"client","game_name":"tictactoe","game_url":"games.example.com"}"#,
/// )
/// .expect("valid payload");
/// assert_eq!(data.project_type(), ProjectType::Client);
/// assert!(data.library_version().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateData {
    project_type: ProjectType,
    game_name: String,
    game_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    library_version: Option<Version>,
    #[serde(default = "current_directory")]
    project_directory: PathBuf,
}

impl CreateData {
    /// Creates a payload targeting the current directory with no pinned
    /// library version.
    #[must_use]
    pub fn new(
        project_type: ProjectType,
        game_name: impl Into<String>,
        game_url: impl Into<String>,
    ) -> Self {
        Self {
            project_type,
            game_name: game_name.into(),
            game_url: game_url.into(),
            library_version: None,
            project_directory: current_directory(),
        }
    }

    /// Pins the client/server library version.
    #[must_use]
    pub const fn with_library_version(mut self, version: Version) -> Self {
        self.library_version = Some(version);
        self
    }

    /// Overrides the project directory.
    #[must_use]
    pub fn with_project_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.project_directory = directory.into();
        self
    }

    /// Returns the requested project type.
    #[must_use]
    pub const fn project_type(&self) -> ProjectType {
        self.project_type
    }

    /// Returns the game name.
    #[must_use]
    pub const fn game_name(&self) -> &str {
        self.game_name.as_str()
    }

    /// Returns the game locator.
    #[must_use]
    pub const fn game_url(&self) -> &str {
        self.game_url.as_str()
    }

    /// Returns the pinned library version, if any.
    #[must_use]
    pub const fn library_version(&self) -> Option<Version> {
        self.library_version
    }

    /// Returns the directory the project is scaffolded into.
    #[must_use]
    pub fn project_directory(&self) -> &Path {
        &self.project_directory
    }
}

/// Parameters for running a scaffolded client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunClientData {
    game_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    game_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    join_secret: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default = "current_directory")]
    project_directory: PathBuf,
}

impl RunClientData {
    /// Creates a payload for the client in the current directory.
    #[must_use]
    pub fn new(game_url: impl Into<String>) -> Self {
        Self {
            game_url: game_url.into(),
            game_id: None,
            join_secret: None,
            args: Vec::new(),
            project_directory: current_directory(),
        }
    }

    /// Selects the game instance to join.
    #[must_use]
    pub fn with_game_id(mut self, game_id: impl Into<String>) -> Self {
        self.game_id = Some(game_id.into());
        self
    }

    /// Overrides the project directory.
    #[must_use]
    pub fn with_project_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.project_directory = directory.into();
        self
    }

    /// Returns the game server locator.
    #[must_use]
    pub const fn game_url(&self) -> &str {
        self.game_url.as_str()
    }

    /// Returns the game instance to join, if any.
    #[must_use]
    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }

    /// Returns the secret used to join a protected game, if any.
    #[must_use]
    pub fn join_secret(&self) -> Option<&str> {
        self.join_secret.as_deref()
    }

    /// Returns extra arguments forwarded to the client.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the project directory.
    #[must_use]
    pub fn project_directory(&self) -> &Path {
        &self.project_directory
    }
}

/// Parameters for running a scaffolded server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunServerData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default = "current_directory")]
    project_directory: PathBuf,
}

impl Default for RunServerData {
    fn default() -> Self {
        Self {
            port: None,
            args: Vec::new(),
            project_directory: current_directory(),
        }
    }
}

impl RunServerData {
    /// Sets the port the server should listen on.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Overrides the project directory.
    #[must_use]
    pub fn with_project_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.project_directory = directory.into();
        self
    }

    /// Returns the requested port, if any.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns extra arguments forwarded to the server.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the project directory.
    #[must_use]
    pub fn project_directory(&self) -> &Path {
        &self.project_directory
    }
}

/// Reads and decodes the payload for `action` from the configured source.
///
/// # Errors
///
/// Returns [`ActionDataError::Missing`] when no source is configured,
/// [`ActionDataError::Read`] when the payload file cannot be read and
/// [`ActionDataError::Decode`] when the JSON does not match `T`.
pub fn load_action_data<T: DeserializeOwned>(
    config: &Config,
    action: Action,
) -> Result<T, ActionDataError> {
    let raw = read_raw(config, action)?;
    serde_json::from_str(raw.trim()).map_err(|source| ActionDataError::Decode { action, source })
}

fn read_raw(config: &Config, action: Action) -> Result<String, ActionDataError> {
    if let Some(path) = config.action_data_path.as_ref() {
        debug!(
            target: ACTION_DATA_TARGET,
            %action,
            path = %path,
            "reading action data from file"
        );
        return std::fs::read_to_string(path).map_err(|source| ActionDataError::Read {
            path: path.as_std_path().to_path_buf(),
            source: Arc::new(source),
        });
    }

    config
        .action_data
        .clone()
        .ok_or(ActionDataError::Missing { action })
}

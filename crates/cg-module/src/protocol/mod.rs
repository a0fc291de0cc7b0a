//! Wire types shared between the orchestrator and a module process.
//!
//! The orchestrator spawns the module with a single [`Action`] token. For
//! `info` the module writes exactly one [`ModuleInfo`] JSON line to standard
//! output and nothing else. Every other action reads a JSON payload prepared
//! by the orchestrator (see [`crate::action_data`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::version::Version;

/// Version of the module protocol contract reported by `info`.
///
/// The major component changes when the action set or the payload shapes
/// change incompatibly.
pub const PROTOCOL_VERSION: Version = Version::new(1, 0, 0);

/// The side of a game project an action targets.
///
/// The declaration order is the reporting order: client before server.
///
/// # Example
///
/// ```
/// use cg_module::ProjectType;
///
/// assert_eq!(ProjectType::Server.as_str(), "server");
/// assert!(ProjectType::Client < ProjectType::Server);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    /// A game client that connects to a running game server.
    Client,
    /// A game server implementation.
    Server,
}

impl ProjectType {
    /// Both project types in reporting order.
    pub const ALL: [Self; 2] = [Self::Client, Self::Server];

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of actions an orchestrator may request.
///
/// # Example
///
/// ```
/// use cg_module::Action;
///
/// assert_eq!(Action::from_token("run-client"), Some(Action::RunClient));
/// assert_eq!(Action::from_token("build"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Report capabilities and implemented actions.
    Info,
    /// Scaffold a new client or server project.
    Create,
    /// Run an existing client project.
    RunClient,
    /// Run an existing server project.
    RunServer,
}

impl Action {
    /// Every action in reporting order.
    pub const ALL: [Self; 4] = [Self::Info, Self::Create, Self::RunClient, Self::RunServer];

    /// Returns the command-line token for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Create => "create",
            Self::RunClient => "run-client",
            Self::RunServer => "run-server",
        }
    }

    /// Resolves a command-line token, returning `None` for unknown tokens.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == token)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Library versions per project type as reported by `info`.
///
/// Unsupported project types are omitted from the serialised form entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryVersions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client: Option<Vec<Version>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    server: Option<Vec<Version>>,
}

impl LibraryVersions {
    /// Creates the projection from optional per-type version lists.
    #[must_use]
    pub const fn new(client: Option<Vec<Version>>, server: Option<Vec<Version>>) -> Self {
        Self { client, server }
    }

    /// Returns the versions reported for `project_type`, if any.
    #[must_use]
    pub fn get(&self, project_type: ProjectType) -> Option<&[Version]> {
        match project_type {
            ProjectType::Client => self.client.as_deref(),
            ProjectType::Server => self.server.as_deref(),
        }
    }
}

/// Capability report written to standard output for the `info` action.
///
/// Built fresh for every invocation; see [`crate::info::report_info`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    protocol_version: Version,
    name: String,
    display_name: String,
    version: Version,
    library_versions: LibraryVersions,
    project_types: Vec<ProjectType>,
    actions: Vec<Action>,
}

impl ModuleInfo {
    /// Assembles a report. Callers are expected to derive `project_types`
    /// and `actions` from the registry and handler table.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        version: Version,
        library_versions: LibraryVersions,
        project_types: Vec<ProjectType>,
        actions: Vec<Action>,
    ) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            name: name.into(),
            display_name: display_name.into(),
            version,
            library_versions,
            project_types,
            actions,
        }
    }

    /// Returns the protocol contract version.
    #[must_use]
    pub const fn protocol_version(&self) -> Version {
        self.protocol_version
    }

    /// Returns the module name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the human-facing module name.
    #[must_use]
    pub const fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the module's own version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns the per-project-type library versions.
    #[must_use]
    pub const fn library_versions(&self) -> &LibraryVersions {
        &self.library_versions
    }

    /// Returns the supported project types in client-then-server order.
    #[must_use]
    pub fn project_types(&self) -> &[ProjectType] {
        &self.project_types
    }

    /// Returns the implemented actions.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

/// A message produced while reading or parsing a CGE document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    severity: DiagnosticSeverity,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    column: Option<u32>,
}

impl Diagnostic {
    /// Creates a diagnostic with the given severity and message.
    #[must_use]
    pub fn new(severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Creates an error-severity diagnostic.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, message)
    }

    /// Creates a warning-severity diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, message)
    }

    /// Attaches a 1-based source position.
    #[must_use]
    pub const fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Returns the severity level.
    #[must_use]
    pub const fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }

    /// Returns the message text.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns the 1-based line, when known.
    #[must_use]
    pub const fn line(&self) -> Option<u32> {
        self.line
    }

    /// Returns `true` for error-severity diagnostics.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, "{line}:{column}: {}", self.message),
            (Some(line), None) => write!(f, "{line}: {}", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    /// Parsing cannot produce a usable result.
    Error,
    /// Suspicious input that does not prevent parsing.
    Warning,
    /// Informational message.
    Info,
}

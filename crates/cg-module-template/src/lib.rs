//! Reference CodeGame language module.
//!
//! `cgmod-template` implements every protocol action without generating any
//! language-specific code. `create` resolves the game schema and records the
//! project in the target directory; the run actions print the launch plan an
//! orchestrator would execute as a single JSON line. The binary is the
//! process-level test subject for `cg-module`.

#[cfg(test)]
mod tests;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cg_module::{
    ActionHandler, Capabilities, CreateData, DescriptorError, HandlerError, Module, ModuleContext,
    ModuleDescriptor, ProjectType, RunClientData, RunServerData, Version,
};
use cg_module_cge::{GameDefinition, Resolution, SchemaError, SchemaResolver};
use cg_module_config::Config;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

const TEMPLATE_TARGET: &str = "cg_module_template";

/// Name of the project file written by `create`.
pub const PROJECT_FILE: &str = ".codegame.json";

/// Language identifier recorded in project files and launch plans.
pub const LANGUAGE: &str = "template";

/// Describes this module's identity and supported library versions.
///
/// # Errors
///
/// Returns a [`DescriptorError`] if the static declaration is invalid.
pub fn descriptor() -> Result<ModuleDescriptor, DescriptorError> {
    let capabilities = Capabilities::builder()
        .client([Version::new(0, 1, 0)])
        .server([Version::new(0, 1, 0), Version::new(0, 2, 0)])
        .build()?;
    ModuleDescriptor::new(LANGUAGE, "Template", Version::new(0, 1, 0), capabilities)
}

/// Builds the module with all three action handlers wired to the real
/// schema resolver and standard output.
///
/// # Errors
///
/// Returns a [`DescriptorError`] if the descriptor is invalid.
pub fn module() -> Result<Module<'static>, DescriptorError> {
    Ok(Module::new(descriptor()?)
        .with_create(CreateProject::new(ConfiguredSchemaSource))
        .with_run_client(Launcher::new(io::stdout()))
        .with_run_server(Launcher::new(io::stdout())))
}

/// Errors raised by the template handlers.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// `create` found an existing project file.
    #[error("a CodeGame project already exists at '{}'", path.display())]
    ProjectExists {
        /// Path of the existing project file.
        path: PathBuf,
    },
    /// The game name cannot be used as a file name.
    #[error("invalid game name '{name}'")]
    InvalidGameName {
        /// The rejected name.
        name: String,
    },
    /// `create` ran without a selected library version.
    #[error("no {project_type} library version was selected")]
    MissingLibraryVersion {
        /// The project type being created.
        project_type: ProjectType,
    },
    /// A run action found no project file.
    #[error("no CodeGame project found in '{}'", directory.display())]
    NotAProject {
        /// Directory that was searched.
        directory: PathBuf,
    },
    /// The project file exists but could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    ReadProject {
        /// Path of the project file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The project file is not valid JSON of the expected shape.
    #[error("invalid project file '{}': {source}", path.display())]
    DecodeProject {
        /// Path of the project file.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// The project was created for the other side of the game.
    #[error("'{}' is a {found} project, not a {expected} project", directory.display())]
    WrongProjectType {
        /// Project directory.
        directory: PathBuf,
        /// Type required by the action.
        expected: ProjectType,
        /// Type recorded in the project file.
        found: ProjectType,
    },
    /// Writing a project artefact failed.
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// Serialising a JSON artefact failed.
    #[error("failed to serialise {what}: {source}")]
    Serialize {
        /// Description of the artefact.
        what: &'static str,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// Writing the launch plan to standard output failed.
    #[error("failed to write launch plan: {source}")]
    Output {
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The game schema could not be resolved.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Contents of the `.codegame.json` project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    game_url: String,
    #[serde(rename = "type")]
    project_type: ProjectType,
    lang: String,
    library_version: Version,
    game_name: String,
}

impl ProjectFile {
    /// Describes a project of this module's language.
    #[must_use]
    pub fn new(
        project_type: ProjectType,
        game_name: impl Into<String>,
        game_url: impl Into<String>,
        library_version: Version,
    ) -> Self {
        Self {
            game_url: game_url.into(),
            project_type,
            lang: LANGUAGE.to_owned(),
            library_version,
            game_name: game_name.into(),
        }
    }

    /// Reads the project file in `directory`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::NotAProject`] when the file is absent and a
    /// read or decode error otherwise.
    pub fn load(directory: &Path) -> Result<Self, TemplateError> {
        let path = directory.join(PROJECT_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(TemplateError::NotAProject {
                    directory: directory.to_path_buf(),
                });
            }
            Err(error) => {
                return Err(TemplateError::ReadProject {
                    path,
                    source: Arc::new(error),
                });
            }
        };
        serde_json::from_str(&raw).map_err(|source| TemplateError::DecodeProject { path, source })
    }

    /// Returns the game locator recorded at creation.
    #[must_use]
    pub const fn game_url(&self) -> &str {
        self.game_url.as_str()
    }

    /// Returns the project type.
    #[must_use]
    pub const fn project_type(&self) -> ProjectType {
        self.project_type
    }

    /// Returns the language identifier.
    #[must_use]
    pub const fn lang(&self) -> &str {
        self.lang.as_str()
    }

    /// Returns the library version the project was created with.
    #[must_use]
    pub const fn library_version(&self) -> Version {
        self.library_version
    }

    /// Returns the game name.
    #[must_use]
    pub const fn game_name(&self) -> &str {
        self.game_name.as_str()
    }

    fn require(&self, directory: &Path, expected: ProjectType) -> Result<(), TemplateError> {
        if self.project_type == expected {
            return Ok(());
        }
        Err(TemplateError::WrongProjectType {
            directory: directory.to_path_buf(),
            expected,
            found: self.project_type,
        })
    }
}

/// Resolves a game locator into its definition.
#[cfg_attr(test, mockall::automock)]
pub trait SchemaSource {
    /// Fetches and parses the schema for `locator`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when resolution fails.
    fn resolve(&self, config: &Config, locator: &str) -> Result<GameDefinition, SchemaError>;
}

/// Resolves schemas with installed parsers discovered from configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfiguredSchemaSource;

impl SchemaSource for ConfiguredSchemaSource {
    fn resolve(&self, config: &Config, locator: &str) -> Result<GameDefinition, SchemaError> {
        SchemaResolver::from_config(config)?
            .resolve(locator)
            .map(Resolution::into_definition)
    }
}

/// `create` handler: records the project and its game schema.
#[derive(Debug)]
pub struct CreateProject<S> {
    source: S,
}

impl<S: SchemaSource> CreateProject<S> {
    /// Creates the handler around a schema source.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Writes `.codegame.json` and `<game_name>.cge.json` into the project
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if a project already exists, the game name
    /// is unusable, the schema cannot be resolved or a file cannot be written.
    pub fn create(&self, data: &CreateData, config: &Config) -> Result<ProjectFile, TemplateError> {
        let directory = data.project_directory();
        let project_path = directory.join(PROJECT_FILE);
        if project_path.exists() {
            return Err(TemplateError::ProjectExists { path: project_path });
        }
        let game_name = data.game_name();
        if !is_valid_game_name(game_name) {
            return Err(TemplateError::InvalidGameName {
                name: game_name.to_owned(),
            });
        }
        let library_version = data
            .library_version()
            .ok_or(TemplateError::MissingLibraryVersion {
                project_type: data.project_type(),
            })?;

        let definition = self.source.resolve(config, data.game_url())?;
        debug!(
            target: TEMPLATE_TARGET,
            game = definition.name(),
            cge_version = %definition.cge_version(),
            "resolved game schema"
        );

        fs::create_dir_all(directory).map_err(|source| TemplateError::Write {
            path: directory.to_path_buf(),
            source: Arc::new(source),
        })?;
        let schema_path = directory.join(format!("{game_name}.cge.json"));
        write_json(&schema_path, "game definition", &definition)?;
        let project = ProjectFile::new(
            data.project_type(),
            game_name,
            data.game_url(),
            library_version,
        );
        // The schema only exists alongside a project file.
        if let Err(error) = write_json(&project_path, "project file", &project) {
            discard(&schema_path);
            return Err(error);
        }

        info!(
            target: TEMPLATE_TARGET,
            game = game_name,
            project_type = %data.project_type(),
            %library_version,
            directory = %directory.display(),
            "created project"
        );
        Ok(project)
    }
}

impl<S: SchemaSource> ActionHandler<CreateData> for CreateProject<S> {
    fn handle(&mut self, data: CreateData, context: &ModuleContext) -> Result<(), HandlerError> {
        self.create(&data, context.config())?;
        Ok(())
    }
}

fn is_valid_game_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

fn write_json<T: Serialize>(
    path: &Path,
    what: &'static str,
    value: &T,
) -> Result<(), TemplateError> {
    let mut encoded = serde_json::to_string_pretty(value)
        .map_err(|source| TemplateError::Serialize { what, source })?;
    encoded.push('\n');
    fs::write(path, encoded).map_err(|source| TemplateError::Write {
        path: path.to_path_buf(),
        source: Arc::new(source),
    })
}

fn discard(path: &Path) {
    if let Err(error) = fs::remove_file(path) {
        warn!(
            target: TEMPLATE_TARGET,
            path = %path.display(),
            %error,
            "failed to remove partially written schema"
        );
    }
}

/// How the orchestrator should start a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchPlan {
    #[serde(rename = "type")]
    project_type: ProjectType,
    lang: String,
    game_name: String,
    game_url: String,
    library_version: Version,
    directory: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    game_id: Option<String>,
    #[serde(default)]
    args: Vec<String>,
}

impl LaunchPlan {
    fn for_project(project: &ProjectFile, directory: &Path, args: &[String]) -> Self {
        Self {
            project_type: project.project_type(),
            lang: project.lang().to_owned(),
            game_name: project.game_name().to_owned(),
            game_url: project.game_url().to_owned(),
            library_version: project.library_version(),
            directory: directory.to_path_buf(),
            port: None,
            game_id: None,
            args: args.to_vec(),
        }
    }

    /// Returns the project type being launched.
    #[must_use]
    pub const fn project_type(&self) -> ProjectType {
        self.project_type
    }

    /// Returns the game server the project talks to.
    #[must_use]
    pub const fn game_url(&self) -> &str {
        self.game_url.as_str()
    }

    /// Returns the library version the project was created with.
    #[must_use]
    pub const fn library_version(&self) -> Version {
        self.library_version
    }

    /// Returns the listening port for servers.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the game instance a client joins.
    #[must_use]
    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }

    /// Returns arguments forwarded to the project.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// `run-client` and `run-server` handler: prints the launch plan.
#[derive(Debug)]
pub struct Launcher<W> {
    writer: W,
}

impl<W: Write> Launcher<W> {
    /// Creates a launcher writing plans to `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    fn emit(&mut self, plan: &LaunchPlan) -> Result<(), TemplateError> {
        let line = serde_json::to_string(plan).map_err(|source| TemplateError::Serialize {
            what: "launch plan",
            source,
        })?;
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .map_err(|source| TemplateError::Output {
                source: Arc::new(source),
            })
    }

    fn launch_client(&mut self, data: &RunClientData) -> Result<(), TemplateError> {
        let directory = data.project_directory();
        let project = ProjectFile::load(directory)?;
        project.require(directory, ProjectType::Client)?;
        let plan = LaunchPlan {
            game_url: data.game_url().to_owned(),
            game_id: data.game_id().map(str::to_owned),
            ..LaunchPlan::for_project(&project, directory, data.args())
        };
        self.emit(&plan)
    }

    fn launch_server(&mut self, data: &RunServerData) -> Result<(), TemplateError> {
        let directory = data.project_directory();
        let project = ProjectFile::load(directory)?;
        project.require(directory, ProjectType::Server)?;
        let plan = LaunchPlan {
            port: data.port(),
            ..LaunchPlan::for_project(&project, directory, data.args())
        };
        self.emit(&plan)
    }
}

impl<W: Write> ActionHandler<RunClientData> for Launcher<W> {
    fn handle(
        &mut self,
        data: RunClientData,
        _context: &ModuleContext,
    ) -> Result<(), HandlerError> {
        self.launch_client(&data)?;
        Ok(())
    }
}

impl<W: Write> ActionHandler<RunServerData> for Launcher<W> {
    fn handle(
        &mut self,
        data: RunServerData,
        _context: &ModuleContext,
    ) -> Result<(), HandlerError> {
        self.launch_server(&data)?;
        Ok(())
    }
}

//! Unit tests for the template module handlers.

use std::ffi::OsString;
use std::path::Path;

use cg_module::{Action, ModuleContext, Outcome};
use cg_module_cge::{ObjectDefinition, Property, PropertyType};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

fn chess() -> GameDefinition {
    GameDefinition::new("chess", Version::new(0, 5, 0)).with_command(
        ObjectDefinition::new("move")
            .with_property(Property::new("from", PropertyType::named("string")))
            .with_property(Property::new("to", PropertyType::named("string"))),
    )
}

fn source_returning(definition: GameDefinition) -> MockSchemaSource {
    let mut source = MockSchemaSource::new();
    source
        .expect_resolve()
        .withf(|_, locator| locator == "games.example.com")
        .times(1)
        .returning(move |_, _| Ok(definition.clone()));
    source
}

fn unused_source() -> MockSchemaSource {
    let mut source = MockSchemaSource::new();
    source.expect_resolve().never();
    source
}

fn create_data(project_type: ProjectType, directory: &Path) -> CreateData {
    CreateData::new(project_type, "chess", "games.example.com")
        .with_library_version(Version::new(0, 2, 0))
        .with_project_directory(directory)
}

#[fixture]
fn workspace() -> TempDir {
    TempDir::new().expect("temp dir")
}

fn write_project(directory: &Path, project_type: ProjectType) {
    let project = ProjectFile::new(
        project_type,
        "chess",
        "games.example.com",
        Version::new(0, 1, 0),
    );
    let encoded = serde_json::to_string(&project).expect("encode project");
    std::fs::write(directory.join(PROJECT_FILE), encoded).expect("write project");
}

#[test]
fn descriptor_advertises_every_action() {
    let module = module().expect("module");
    let info = module.info();

    assert_eq!(info.name(), "template");
    assert_eq!(info.project_types(), &[ProjectType::Client, ProjectType::Server]);
    assert_eq!(info.actions(), Action::ALL.as_slice());
}

#[rstest]
fn create_writes_project_and_schema(workspace: TempDir) {
    let handler = CreateProject::new(source_returning(chess()));
    let directory = workspace.path().join("chess-server");

    let project = handler
        .create(&create_data(ProjectType::Server, &directory), &Config::default())
        .expect("created");

    assert_eq!(project.library_version(), Version::new(0, 2, 0));
    let written: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(directory.join(PROJECT_FILE)).expect("project file"),
    )
    .expect("project json");
    assert_eq!(
        written,
        serde_json::json!({
            "game_url": "games.example.com",
            "type": "server",
            "lang": "template",
            "library_version": "0.2.0",
            "game_name": "chess",
        })
    );
    let schema: GameDefinition = serde_json::from_str(
        &std::fs::read_to_string(directory.join("chess.cge.json")).expect("schema file"),
    )
    .expect("schema json");
    assert_eq!(schema, chess());
}

#[rstest]
fn create_refuses_existing_project(workspace: TempDir) {
    write_project(workspace.path(), ProjectType::Client);
    let handler = CreateProject::new(unused_source());

    let error = handler
        .create(
            &create_data(ProjectType::Client, workspace.path()),
            &Config::default(),
        )
        .expect_err("existing project");

    assert!(matches!(error, TemplateError::ProjectExists { .. }), "got: {error}");
}

#[rstest]
#[case::empty("")]
#[case::parent("..")]
#[case::nested("games/chess")]
#[case::windows("games\\chess")]
fn create_rejects_unusable_game_names(workspace: TempDir, #[case] name: &str) {
    let handler = CreateProject::new(unused_source());
    let data = CreateData::new(ProjectType::Server, name, "games.example.com")
        .with_library_version(Version::new(0, 1, 0))
        .with_project_directory(workspace.path());

    let error = handler
        .create(&data, &Config::default())
        .expect_err("invalid name");

    assert!(matches!(error, TemplateError::InvalidGameName { .. }), "got: {error}");
}

#[rstest]
fn create_requires_selected_library_version(workspace: TempDir) {
    let handler = CreateProject::new(unused_source());
    let data = CreateData::new(ProjectType::Client, "chess", "games.example.com")
        .with_project_directory(workspace.path());

    let error = handler
        .create(&data, &Config::default())
        .expect_err("no version");

    assert_eq!(error.to_string(), "no client library version was selected");
}

#[rstest]
fn schema_failure_leaves_directory_untouched(workspace: TempDir) {
    let mut source = MockSchemaSource::new();
    source.expect_resolve().times(1).returning(|_, _| {
        Err(SchemaError::UnsupportedSchemaVersion {
            version: Version::new(3, 0, 0),
        })
    });
    let handler = CreateProject::new(source);

    let error = handler
        .create(
            &create_data(ProjectType::Server, workspace.path()),
            &Config::default(),
        )
        .expect_err("schema failure");

    assert_eq!(error.to_string(), "unsupported CGE version '3.0.0'");
    assert!(!workspace.path().join(PROJECT_FILE).exists());
}

#[rstest]
fn failed_project_write_removes_schema(workspace: TempDir) {
    let directory = workspace.path().to_path_buf();
    let mut source = MockSchemaSource::new();
    let blocked = directory.join(PROJECT_FILE);
    source.expect_resolve().times(1).returning(move |_, _| {
        // Occupies the project file path after the existence check.
        std::fs::create_dir(&blocked).expect("block project file");
        Ok(chess())
    });
    let handler = CreateProject::new(source);

    let error = handler
        .create(&create_data(ProjectType::Server, &directory), &Config::default())
        .expect_err("project file cannot be written");

    assert!(matches!(error, TemplateError::Write { .. }), "got: {error}");
    assert!(!directory.join("chess.cge.json").exists());
}

#[rstest]
fn dispatched_create_uses_newest_library_version(workspace: TempDir) {
    let directory = workspace.path().join("chess-server");
    let payload = serde_json::json!({
        "project_type": "server",
        "game_name": "chess",
        "game_url": "games.example.com",
        "project_directory": directory,
    });
    let context = ModuleContext::new(Config {
        action_data: Some(payload.to_string()),
        ..Config::default()
    });
    let mut module = Module::new(descriptor().expect("descriptor"))
        .with_create(CreateProject::new(source_returning(chess())));
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let outcome = module.dispatch(
        ["cgmod-template", "create"].map(OsString::from),
        &context,
        &mut stdout,
        &mut stderr,
    );

    assert_eq!(outcome, Outcome::Success, "{}", String::from_utf8_lossy(&stderr));
    assert!(stdout.is_empty());
    let project = ProjectFile::load(&directory).expect("project");
    assert_eq!(project.library_version(), Version::new(0, 2, 0));
}

#[rstest]
fn run_server_prints_launch_plan(workspace: TempDir) {
    write_project(workspace.path(), ProjectType::Server);
    let mut output = Vec::new();
    let data = RunServerData::default()
        .with_port(8080)
        .with_project_directory(workspace.path());

    Launcher::new(&mut output)
        .launch_server(&data)
        .expect("launched");

    let text = String::from_utf8(output).expect("utf8");
    assert_eq!(text.lines().count(), 1);
    let plan: LaunchPlan = serde_json::from_str(&text).expect("plan json");
    assert_eq!(plan.project_type(), ProjectType::Server);
    assert_eq!(plan.port(), Some(8080));
    assert_eq!(plan.game_url(), "games.example.com");
    assert_eq!(plan.library_version(), Version::new(0, 1, 0));
}

#[rstest]
fn run_client_uses_requested_game(workspace: TempDir) {
    write_project(workspace.path(), ProjectType::Client);
    let mut output = Vec::new();
    let data = RunClientData::new("localhost:8080")
        .with_game_id("a1b2")
        .with_project_directory(workspace.path());

    Launcher::new(&mut output)
        .launch_client(&data)
        .expect("launched");

    let plan: LaunchPlan = serde_json::from_slice(&output).expect("plan json");
    assert_eq!(plan.game_url(), "localhost:8080");
    assert_eq!(plan.game_id(), Some("a1b2"));
    assert!(plan.args().is_empty());
}

#[rstest]
fn run_client_rejects_server_project(workspace: TempDir) {
    write_project(workspace.path(), ProjectType::Server);
    let mut output = Vec::new();
    let data = RunClientData::new("localhost:8080").with_project_directory(workspace.path());

    let error = Launcher::new(&mut output)
        .launch_client(&data)
        .expect_err("wrong type");

    assert!(
        matches!(
            error,
            TemplateError::WrongProjectType {
                expected: ProjectType::Client,
                found: ProjectType::Server,
                ..
            }
        ),
        "got: {error}"
    );
    assert!(output.is_empty());
}

#[rstest]
fn run_outside_project_fails(workspace: TempDir) {
    let mut output = Vec::new();
    let data = RunServerData::default().with_project_directory(workspace.path());

    let error = Launcher::new(&mut output)
        .launch_server(&data)
        .expect_err("no project");

    assert!(matches!(error, TemplateError::NotAProject { .. }), "got: {error}");
}

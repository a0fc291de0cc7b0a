//! Unit tests for external parser execution.

use std::fs;
use std::os::unix::fs::PermissionsExt;

use cg_module::DiagnosticSeverity;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

const DOCUMENT: &str = "name demo\ncge v0.5\n";

#[fixture]
fn scripts() -> TempDir {
    TempDir::new().expect("temp dir")
}

fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

fn echo_parser(dir: &TempDir) -> ProcessParser {
    let path = script(
        dir,
        "cge-parser-0.5.0",
        r#"input=$(cat)
echo "{\"definition\":{\"name\":\"demo\",\"cge_version\":\"0.5.0\"},\"diagnostics\":[{\"severity\":\"warning\",\"message\":\"args=$* lines=$(printf '%s\n' "$input" | wc -l | tr -d ' ')\"}]}""#,
    );
    ProcessParser::new(path, Duration::from_secs(10))
}

#[rstest]
#[case::with_comments(true, "args=--comments lines=2")]
#[case::without_comments(false, "args= lines=2")]
fn parses_document_through_process(
    scripts: TempDir,
    #[case] include_comments: bool,
    #[case] expected: &str,
) {
    let parser = echo_parser(&scripts);

    let output = parser
        .parse(DOCUMENT, ParseOptions::new(include_comments))
        .expect("parser succeeds");

    let definition = output.definition().expect("definition");
    assert_eq!(definition.name(), "demo");
    let diagnostic = output.diagnostics().first().expect("diagnostic");
    assert_eq!(diagnostic.severity(), DiagnosticSeverity::Warning);
    assert_eq!(diagnostic.message(), expected);
}

#[rstest]
fn non_zero_exit_is_reported(scripts: TempDir) {
    let path = script(&scripts, "cge-parser-0.5.0", "cat >/dev/null\necho broken >&2\nexit 3");
    let parser = ProcessParser::new(path, Duration::from_secs(10));

    let error = parser
        .parse(DOCUMENT, ParseOptions::default())
        .expect_err("exit status 3");

    assert!(
        matches!(error, SchemaError::ParserExit { status: 3, .. }),
        "got: {error}"
    );
}

#[rstest]
#[case::not_json("cat >/dev/null\necho nope")]
#[case::silent("cat >/dev/null")]
fn invalid_output_is_reported(scripts: TempDir, #[case] body: &str) {
    let path = script(&scripts, "cge-parser-0.5.0", body);
    let parser = ProcessParser::new(path, Duration::from_secs(10));

    let error = parser
        .parse(DOCUMENT, ParseOptions::default())
        .expect_err("invalid output");

    assert!(
        matches!(error, SchemaError::ParserOutput { .. }),
        "got: {error}"
    );
}

#[rstest]
fn slow_parser_is_killed(scripts: TempDir) {
    let path = script(&scripts, "cge-parser-0.5.0", "exec sleep 5");
    let parser = ProcessParser::new(path, Duration::from_millis(200));

    let started = Instant::now();
    let error = parser
        .parse(DOCUMENT, ParseOptions::default())
        .expect_err("timeout");

    assert!(
        matches!(error, SchemaError::ParserTimeout { .. }),
        "got: {error}"
    );
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[rstest]
fn missing_executable_fails_to_spawn(scripts: TempDir) {
    let parser = ProcessParser::new(
        scripts.path().join("cge-parser-0.5.0"),
        Duration::from_secs(1),
    );

    let error = parser
        .parse(DOCUMENT, ParseOptions::default())
        .expect_err("spawn failure");

    assert!(
        matches!(error, SchemaError::ParserSpawn { .. }),
        "got: {error}"
    );
}

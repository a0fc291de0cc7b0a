//! Unit tests for the process entry point.

use std::fs;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;
use crate::action_data::RunServerData;
use crate::capability::{Capabilities, ModuleDescriptor};
use crate::error::HandlerError;
use crate::version::Version;

struct StaticConfigLoader(Config);

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _program: &OsStr) -> Result<Config, Arc<OrthoError>> {
        Ok(self.0.clone())
    }
}

struct MalformedFileLoader {
    _dir: TempDir,
    path: std::path::PathBuf,
}

impl MalformedFileLoader {
    fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("cg-module.toml");
        fs::write(&path, "parser_timeout_secs = \"soon\"\n").expect("write config");
        Self { _dir: dir, path }
    }
}

impl ConfigLoader for MalformedFileLoader {
    fn load(&self, program: &OsStr) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter([
            program.to_os_string(),
            OsString::from("--config-path"),
            self.path.clone().into_os_string(),
        ])
    }
}

#[fixture]
fn descriptor() -> ModuleDescriptor {
    let capabilities = Capabilities::builder()
        .server([Version::new(0, 1, 0)])
        .build()
        .expect("capabilities");
    ModuleDescriptor::new("runtime", "Runtime", Version::new(0, 1, 0), capabilities)
        .expect("descriptor")
}

fn args(tokens: &[&str]) -> Vec<OsString> {
    tokens.iter().copied().map(OsString::from).collect()
}

fn run_captured(
    module: &mut Module<'_>,
    tokens: &[&str],
    loader: &impl ConfigLoader,
) -> (Outcome, String, String) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let outcome = run_with(module, args(tokens), loader, &mut stdout, &mut stderr);
    (
        outcome,
        String::from_utf8(stdout).expect("utf8 stdout"),
        String::from_utf8(stderr).expect("utf8 stderr"),
    )
}

#[rstest]
fn info_succeeds_with_loaded_configuration(descriptor: ModuleDescriptor) {
    let mut module = Module::new(descriptor);
    let loader = StaticConfigLoader(Config::default());

    let (outcome, stdout, stderr) = run_captured(&mut module, &["cgmod-runtime", "info"], &loader);

    assert_eq!(outcome, Outcome::Success);
    assert!(stdout.contains(r#""name":"runtime""#), "stdout: {stdout}");
    assert!(stderr.is_empty(), "stderr: {stderr}");
}

#[rstest]
fn usage_is_checked_after_configuration(descriptor: ModuleDescriptor) {
    let mut module = Module::new(descriptor);
    let loader = StaticConfigLoader(Config::default());

    let (outcome, stdout, stderr) = run_captured(&mut module, &["cgmod-runtime"], &loader);

    assert_eq!(outcome, Outcome::Failure);
    assert!(stdout.is_empty());
    assert_eq!(stderr, "USAGE: cgmod-runtime <action>\n");
}

#[rstest]
fn configuration_failure_is_reported(descriptor: ModuleDescriptor) {
    let mut module = Module::new(descriptor);

    let (outcome, stdout, stderr) = run_captured(
        &mut module,
        &["cgmod-runtime", "info"],
        &MalformedFileLoader::new(),
    );

    assert_eq!(outcome, Outcome::Failure);
    assert!(stdout.is_empty(), "info must not run without configuration");
    assert!(
        stderr.starts_with("failed to load configuration:"),
        "stderr: {stderr}"
    );
}

#[rstest]
fn invalid_log_filter_is_reported(descriptor: ModuleDescriptor) {
    let mut module = Module::new(descriptor);
    let loader = StaticConfigLoader(Config {
        log_filter: "cg_module=loud".to_owned(),
        ..Config::default()
    });

    let (outcome, _, stderr) = run_captured(&mut module, &["cgmod-runtime", "info"], &loader);

    assert_eq!(outcome, Outcome::Failure);
    assert!(stderr.starts_with("invalid log filter"), "stderr: {stderr}");
}

#[rstest]
#[case::module_default_applies(DEFAULT_LOG_FILTER, "error")]
#[case::explicit_configuration_wins("debug", "debug")]
fn module_default_log_filter(
    descriptor: ModuleDescriptor,
    #[case] configured: &str,
    #[case] expected: &str,
) {
    let mut seen = Vec::new();
    {
        let mut module = Module::new(descriptor)
            .with_default_log_filter("error")
            .with_run_server(
                |_data: RunServerData, context: &ModuleContext| -> Result<(), HandlerError> {
                    seen.push(context.config().log_filter().to_owned());
                    Ok(())
                },
            );
        let loader = StaticConfigLoader(Config {
            log_filter: configured.to_owned(),
            action_data: Some("{}".to_owned()),
            ..Config::default()
        });

        let (outcome, _, _) = run_captured(&mut module, &["cgmod-runtime", "run-server"], &loader);
        assert_eq!(outcome, Outcome::Success);
    }
    assert_eq!(seen, vec![expected.to_owned()]);
}

#[test]
fn layered_loader_keeps_comments_by_default() {
    let config = OrthoConfigLoader
        .load(OsStr::new("cgmod-runtime"))
        .expect("configuration loads");

    assert!(config.include_comments());
    assert_eq!(config.parser_timeout_secs, Config::default().parser_timeout_secs);
}

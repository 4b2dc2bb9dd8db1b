mod common;
use crate::common::builders::{ConfigFileBuilder, ScenarioBuilder};
use crate::common::init_tracing;

use std::io::Write;

use tempfile::NamedTempFile;

use cmdgate::cli::CliArgs;
use cmdgate::config::{load_and_validate, load_from_path, ConfigFile, DispatcherKind, Outcome};
use cmdgate::errors::CmdgateError;
use cmdgate::scenario;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_parsed_with_defaults() {
    let file = write_config(
        r#"
[config]
dispatcher = "inline"

[scenario.download]
steps = 5

[scenario.upload]
steps = 2
step_delay_ms = 10
outcome = "fail"
error = "disk full"
cancel_after_ms = 100
timeout_ms = 500
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.config.dispatcher, DispatcherKind::Inline);

    let download = &cfg.scenario["download"];
    assert_eq!(download.steps, 5);
    assert_eq!(download.step_delay_ms, 100);
    assert_eq!(download.outcome, Outcome::Succeed);

    let upload = &cfg.scenario["upload"];
    assert_eq!(upload.outcome, Outcome::Fail);
    assert_eq!(upload.error.as_deref(), Some("disk full"));
    assert_eq!(upload.cancel_after_ms, Some(100));
    assert_eq!(upload.timeout_ms, Some(500));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("Cmdgate.toml"));
    assert!(matches!(result, Err(CmdgateError::IoError(_))));
}

#[test]
fn unknown_outcome_is_toml_error() {
    let file = write_config(
        r#"
[scenario.a]
outcome = "explode"
"#,
    );
    match load_from_path(file.path()) {
        Err(CmdgateError::TomlError(_)) => {}
        other => panic!("Expected TomlError, got: {:?}", other),
    }
}

#[test]
fn zero_steps_returns_config_error() {
    let file = write_config(
        r#"
[scenario.empty]
steps = 0
"#,
    );
    match load_and_validate(file.path()) {
        Err(CmdgateError::ConfigError(msg)) => {
            assert!(msg.contains("empty"));
            assert!(msg.contains("steps"));
        }
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn raw_config_without_scenarios_is_rejected() {
    let raw = ConfigFileBuilder::new().build_raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(CmdgateError::ConfigError(_))
    ));
}

#[test]
fn selecting_unknown_scenario_fails() {
    let cfg = ConfigFileBuilder::new()
        .with_scenario("a", ScenarioBuilder::new(1).build())
        .build();

    match scenario::select(&cfg, Some("b")) {
        Err(CmdgateError::ScenarioNotFound(name)) => assert_eq!(name, "b"),
        other => panic!("Expected ScenarioNotFound, got: {:?}", other.map(|v| v.len())),
    }
}

#[test]
fn selecting_all_scenarios_uses_name_order() {
    let cfg = ConfigFileBuilder::new()
        .with_scenario("zeta", ScenarioBuilder::new(1).build())
        .with_scenario("alpha", ScenarioBuilder::new(2).build())
        .build();

    let names: Vec<&str> = scenario::select(&cfg, None)
        .unwrap()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
}

#[tokio::test]
async fn run_executes_configured_scenarios() {
    init_tracing();
    let file = write_config(
        r#"
[config]
dispatcher = "loop"

[scenario.quick]
steps = 2
step_delay_ms = 1

[scenario.aborted]
steps = 50
step_delay_ms = 50
cancel_after_ms = 10
"#,
    );

    let args = CliArgs {
        config: file.path().to_path_buf(),
        scenario: None,
        log_level: None,
        dry_run: false,
    };
    cmdgate::run(args).await.unwrap();
}

#[tokio::test]
async fn dry_run_with_unknown_scenario_fails() {
    let file = write_config(
        r#"
[scenario.quick]
steps = 1
"#,
    );

    let args = CliArgs {
        config: file.path().to_path_buf(),
        scenario: Some("missing".to_string()),
        log_level: None,
        dry_run: true,
    };
    let err = cmdgate::run(args).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CmdgateError>(),
        Some(CmdgateError::ScenarioNotFound(_))
    ));
}

#![cfg(unix)]

mod support;

use installer_core::runtime::process::RELAY_INDENT;
use installer_core::{
    CommandExecutor, Environment, InstallError, MemorySink, Please, Platform, ShellRunner,
};
use std::fs;
use std::sync::Arc;
use support::FixtureProduct;

fn runner(env: &Environment) -> (ShellRunner, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (ShellRunner::new(env.clone(), sink.clone()), sink)
}

fn lines(commands: &[&str]) -> Vec<String> {
    commands.iter().map(|c| c.to_string()).collect()
}

#[tokio::test]
async fn test_batch_stops_at_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let env = Environment::new(Platform::Linux, dir.path()).decorated(true);
    let (runner, sink) = runner(&env);

    let result = runner
        .run_commands(&lines(&["false", "echo hi"]), None, false)
        .await
        .unwrap();

    assert!(!result.success());
    assert!(!sink.contents().contains("hi"));
}

#[tokio::test]
async fn test_output_is_relayed_indented_and_captured() {
    let dir = tempfile::tempdir().unwrap();
    let env = Environment::new(Platform::Linux, dir.path()).decorated(true);
    let (runner, sink) = runner(&env);

    let result = runner
        .run_commands(&lines(&["echo hello", "echo oops 1>&2"]), None, false)
        .await
        .unwrap();

    assert!(result.success());
    assert!(result.output.contains(&"hello".to_string()));
    assert!(result.output.contains(&"oops".to_string()));
    assert!(sink.lines().contains(&format!("{}hello", RELAY_INDENT)));
    assert!(sink.lines().contains(&format!("{}oops", RELAY_INDENT)));
}

#[tokio::test]
async fn test_suppressed_output_is_captured_but_not_relayed() {
    let dir = tempfile::tempdir().unwrap();
    let env = Environment::new(Platform::Linux, dir.path()).decorated(true);
    let (runner, sink) = runner(&env);

    let result = runner
        .run_commands(&lines(&["echo secret"]), None, true)
        .await
        .unwrap();

    assert_eq!(result.output, vec!["secret".to_string()]);
    assert!(sink.lines().is_empty());
}

#[tokio::test]
async fn test_exit_code_and_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    let env = Environment::new(Platform::Linux, dir.path()).decorated(true);
    let (runner, _sink) = runner(&env);

    let result = runner
        .run_commands(&lines(&["touch marker", "exit 3"]), Some(&nested), false)
        .await
        .unwrap();

    assert_eq!(result.exit_code, 3);
    assert!(nested.join("marker").is_file());
    assert!(!dir.path().join("marker").exists());
}

#[tokio::test]
async fn test_undecorated_output_appends_no_ansi() {
    let dir = tempfile::tempdir().unwrap();
    let env = Environment::new(Platform::Linux, dir.path());
    let (runner, _sink) = runner(&env);

    let result = runner
        .run_commands(&lines(&["echo composer"]), None, true)
        .await
        .unwrap();

    assert_eq!(result.output, vec!["composer --no-ansi".to_string()]);
}

#[tokio::test]
async fn test_please_runs_entrypoint_in_project_directory() {
    let dir = tempfile::tempdir().unwrap();
    let product = FixtureProduct::new(dir.path(), &[]);
    let project = dir.path().join("site");
    fs::create_dir(&project).unwrap();
    fs::write(
        project.join("please"),
        "echo \"$*\" >> please.log\ncase \"$1\" in migrate) exit 4 ;; esac\n",
    )
    .unwrap();

    let env = Environment::new(Platform::Linux, dir.path());
    let (runner, _sink) = runner(&env);
    let please = Please::new(&product, Arc::new(runner), &project);

    assert_eq!(please.run(&["--version"]).await.unwrap(), 0);
    assert_eq!(please.run(&["migrate", "--force"]).await.unwrap(), 4);
    assert_eq!(
        support::please_log(&project),
        vec!["--version".to_string(), "migrate --force".to_string()]
    );
}

#[tokio::test]
async fn test_please_outside_a_project_spawns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let product = FixtureProduct::new(dir.path(), &[]);
    let env = Environment::new(Platform::Linux, dir.path());
    let sink = Arc::new(MemorySink::new());
    let spy = Arc::new(support::SpyExecutor::new(&env, sink));
    let please = Please::new(&product, spy.clone(), dir.path());

    let err = please.run(&["--version"]).await.unwrap_err();

    assert!(matches!(err, InstallError::Precondition(_)));
    assert_eq!(err.to_string(), "This does not appear to be a Statamic project.");
    assert!(spy.calls().is_empty());
}

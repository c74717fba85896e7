//! End-to-end CLI tests.
//!
//! Network-free paths only: config/domain management and the embed
//! pipeline, which touches nothing but the filesystem.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;

fn flowsync(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("flowsync").unwrap();
    cmd.env("FLOWSYNC_CONFIG_DIR", config_dir.path());
    cmd
}

#[test]
fn help_lists_subcommands() {
    let config = TempDir::new().unwrap();
    flowsync(&config)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("embed"));
}

#[test]
fn config_show_displays_defaults() {
    let config = TempDir::new().unwrap();
    flowsync(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api_base_url = http://localhost:4201"));
}

#[test]
fn domain_add_use_list_round_trip() {
    let config = TempDir::new().unwrap();

    flowsync(&config)
        .args(["domain", "add", "staging"])
        .assert()
        .success();
    flowsync(&config)
        .args(["domain", "use", "staging"])
        .assert()
        .success();
    flowsync(&config)
        .args(["domain", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("staging"));

    // The default domain is protected.
    flowsync(&config)
        .args(["domain", "remove", "default"])
        .assert()
        .failure();
}

#[test]
fn config_set_persists_across_invocations() {
    let config = TempDir::new().unwrap();
    flowsync(&config)
        .args(["config", "set", "db_host", "db.internal"])
        .assert()
        .success();
    flowsync(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("db.internal"));
}

#[test]
fn update_without_manifest_aborts() {
    let config = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    flowsync(&config)
        .args(["update", "--all"])
        .arg("--project-root")
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("manifest"));
}

#[test]
fn embed_updates_referencing_definitions() {
    let config = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    fs::write(
        project.path().join("flowsync.config.json"),
        r#"{"domain": "core", "paths": {"componentsRoot": "components", "tasks": "Tasks"}}"#,
    )
    .unwrap();
    fs::create_dir_all(project.path().join("components/Tasks")).unwrap();
    fs::create_dir_all(project.path().join("src/Rules")).unwrap();
    fs::write(project.path().join("src/Rules/Check.csx"), "return 1;").unwrap();
    fs::write(
        project.path().join("components/Tasks/task.json"),
        serde_json::to_string(&json!({
            "key": "t1",
            "version": "1.0.0",
            "handler": {"location": "./src/Rules/Check.csx", "code": ""}
        }))
        .unwrap(),
    )
    .unwrap();

    flowsync(&config)
        .args(["embed", "--all"])
        .arg("--project-root")
        .arg(project.path())
        .assert()
        .success();

    let doc: Value = serde_json::from_str(
        &fs::read_to_string(project.path().join("components/Tasks/task.json")).unwrap(),
    )
    .unwrap();
    let code = doc["handler"]["code"].as_str().unwrap();
    assert!(!code.is_empty());
    assert_ne!(code, "return 1;"); // Base64 by default
}

#[test]
fn embed_with_no_scripts_reports_up_to_date() {
    let config = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    fs::write(
        project.path().join("flowsync.config.json"),
        r#"{"domain": "core", "paths": {"componentsRoot": "components", "tasks": "Tasks"}}"#,
    )
    .unwrap();
    fs::create_dir_all(project.path().join("components/Tasks")).unwrap();

    flowsync(&config)
        .args(["embed", "--all"])
        .arg("--project-root")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

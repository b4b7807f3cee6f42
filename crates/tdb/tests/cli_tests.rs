use std::{fs, path::PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use tracing::info;

/// A small loop in `main.tolk` that ends in a user-defined exception.
///
/// Assembly lines 1..=5 map to source lines 2, 3, 3, 4, 4. Steps execute
/// assembly lines 1, 2, 3, 4, 2, 5.
const BUNDLE: &str = r#"{
    "trace": { "steps": [
        { "instructionName": "SETCP", "gasCost": 26, "loc": { "line": 0 } },
        { "instructionName": "PUSHINT", "gasCost": 18, "loc": { "line": 1 },
          "stack": [{ "type": "int", "value": "7" }] },
        { "instructionName": "PUSHINT", "gasCost": 18, "loc": { "line": 2 },
          "stack": [{ "type": "int", "value": "7" }, { "type": "int", "value": "3" }] },
        { "instructionName": "ADD", "gasCost": 18, "loc": { "line": 3 },
          "stack": [{ "type": "int", "value": "10" }] },
        { "instructionName": "PUSHINT", "gasCost": 18, "loc": { "line": 1 },
          "stack": [{ "type": "int", "value": "10" }, { "type": "int", "value": "7" }] },
        { "instructionName": "THROWIF", "gasCost": 9000, "loc": { "line": 4 },
          "stack": [{ "type": "int", "value": "10" }] }
    ] },
    "vm_log": "code cell hash: ab offset: 0\nexecute SETCP 0\ncode cell hash: ab offset: 40\nexecute THROWIF 100\nhandling exception code 100\ndefault exception handler, terminating vm with exit code 100\n",
    "cell_mapping": [{ "hash": "AB", "offset": 40, "index": 1, "instructions": [
        { "name": "ADD", "loc": { "line": 3 } }, { "name": "THROWIF", "loc": { "line": 4 } }
    ] }],
    "func_mapping": {
        "1": { "file": "main.tolk", "line": 2 },
        "2": { "file": "main.tolk", "line": 3 },
        "3": { "file": "main.tolk", "line": 4 }
    },
    "debug_sections": {
        "1": [{ "name": "SETCP", "loc": { "line": 0 } }],
        "2": [{ "name": "PUSHINT", "loc": { "line": 1 } }, { "name": "PUSHINT", "loc": { "line": 2 } }],
        "3": [{ "name": "ADD", "loc": { "line": 3 } }, { "name": "THROWIF", "loc": { "line": 4 } }]
    }
}"#;

struct Session {
    dir: TempDir,
    bundle: PathBuf,
}

impl Session {
    fn new(content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("session.json");
        fs::write(&bundle, content).unwrap();
        Self { dir, bundle }
    }

    /// A `tdb` command whose home directory is the session's temp dir
    fn tdb(&self) -> Command {
        let mut cmd = Command::cargo_bin("tdb").unwrap();
        cmd.env("HOME", self.dir.path()).env_remove("TDB_CONFIG");
        cmd
    }
}

#[test]
fn test_help_command() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Testing CLI help command");

    let mut cmd = Command::cargo_bin("tdb").unwrap();
    cmd.arg("--help").assert().success().stdout(predicate::str::contains("TON Debugger"));
}

#[test]
fn test_version_command() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");
    let mut cmd = Command::cargo_bin("tdb").unwrap();
    cmd.arg("--version").assert().success().stdout(predicate::str::contains("tdb"));
}

#[test]
fn test_missing_subcommand() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");
    let mut cmd = Command::cargo_bin("tdb").unwrap();
    cmd.assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_inspect_first_step() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");
    let session = Session::new(BUNDLE);

    session
        .tdb()
        .arg("inspect")
        .arg(&session.bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 1/6: SETCP"))
        .stdout(predicate::str::contains("asm line: 1"))
        .stdout(predicate::str::contains("gas used: 0"))
        .stdout(predicate::str::contains("Exit code 100: User-defined error"));

    assert!(session.dir.path().join(".tdb.toml").exists());
}

#[test]
fn test_inspect_selected_step() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");
    let session = Session::new(BUNDLE);

    session
        .tdb()
        .args(["inspect", "--step", "3"])
        .arg(&session.bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 4/6: ADD"))
        .stdout(predicate::str::contains("gas used: 62"))
        .stdout(predicate::str::contains("[0] 10"));
}

#[test]
fn test_inspect_step_out_of_range() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");
    let session = Session::new(BUNDLE);

    session
        .tdb()
        .args(["inspect", "--step", "99"])
        .arg(&session.bundle)
        .assert()
        .failure()
        .stderr(predicate::str::contains("step 99 is out of range"));
}

#[test]
fn test_inspect_repeated_clicks_cycle() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");
    let session = Session::new(BUNDLE);

    // asm line 2 executed at steps 1 and 4
    session
        .tdb()
        .args(["inspect", "--line", "2", "--clicks", "2"])
        .arg(&session.bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 5/6: PUSHINT"));

    session
        .tdb()
        .args(["inspect", "--line", "2", "--clicks", "3"])
        .arg(&session.bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 2/6: PUSHINT"));
}

#[test]
fn test_inspect_source_mode() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");
    let session = Session::new(BUNDLE);

    session
        .tdb()
        .args(["inspect", "--source"])
        .arg(&session.bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("source: main.tolk:2 (1/3)"));

    session
        .tdb()
        .args(["inspect", "--source", "--source-line", "4"])
        .arg(&session.bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 6/6: THROWIF"))
        .stdout(predicate::str::contains("source: main.tolk:4 (3/3)"))
        .stdout(predicate::str::contains("gas used: 98"));
}

#[test]
fn test_source_line_requires_source_flag() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");
    let session = Session::new(BUNDLE);

    session
        .tdb()
        .args(["inspect", "--source-line", "4"])
        .arg(&session.bundle)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--source"));
}

#[test]
fn test_steps_listing() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");
    let session = Session::new(BUNDLE);

    session
        .tdb()
        .arg("steps")
        .arg(&session.bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("THROWIF"))
        .stdout(predicate::str::contains("total 124"));

    session
        .tdb()
        .args(["steps", "--source"])
        .arg(&session.bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("main.tolk:2 -> step 0"))
        .stdout(predicate::str::contains("main.tolk:3 -> step 4"))
        .stdout(predicate::str::contains("main.tolk:4 -> step 5"));
}

#[test]
fn test_exit_code_command() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");
    let session = Session::new(BUNDLE);

    session
        .tdb()
        .arg("exit-code")
        .arg(&session.bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit code 100: User-defined error"))
        .stdout(predicate::str::contains("raised by THROWIF at asm line 5"));

    session
        .tdb()
        .args(["exit-code", "--json"])
        .arg(&session.bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"num\": 100"));
}

#[test]
fn test_exit_code_without_log() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");
    let session = Session::new(r#"{ "trace": { "steps": [] } }"#);

    session
        .tdb()
        .arg("exit-code")
        .arg(&session.bundle)
        .assert()
        .failure()
        .stderr(predicate::str::contains("vm_log"));
}

#[test]
fn test_groups_with_custom_palette() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");
    let session = Session::new(BUNDLE);

    session
        .tdb()
        .arg("groups")
        .arg(&session.bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("source-map-group-0 #3b82f6  source [2]  asm [1]"))
        .stdout(predicate::str::contains("source [3]  asm [2, 3]"));

    let config = session.dir.path().join("custom.toml");
    fs::write(&config, "[correlation]\npalette = [\"red\", \"blue\"]\n").unwrap();
    session
        .tdb()
        .arg("--config")
        .arg(&config)
        .arg("groups")
        .arg(&session.bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("source-map-group-2 red  source [4]  asm [4, 5]"));
}

#[test]
fn test_missing_bundle() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");
    let session = Session::new("");

    session
        .tdb()
        .args(["inspect", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read session bundle"));
}

use assert_cmd::Command;
use predicates::prelude::*;

/// Help lists every subcommand.
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("stratus").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("synth"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("outputs"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("stratus").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stratus"));
}

#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("stratus").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

/// synth needs no credentials and prints the declaration.
#[test]
fn test_synth_prints_declaration() {
    let mut cmd = Command::cargo_bin("stratus").unwrap();
    cmd.arg("synth")
        .assert()
        .success()
        .stdout(predicate::str::contains("bucket:website"))
        .stdout(predicate::str::contains("distribution:website"))
        .stdout(predicate::str::contains("aws-dev-shymanouski"));
}

#[test]
fn test_synth_writes_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("declaration.json");

    let mut cmd = Command::cargo_bin("stratus").unwrap();
    cmd.arg("synth")
        .arg("--output")
        .arg(&path)
        .assert()
        .success();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("deployment:website"));
}

#[test]
fn test_validate_prints_summary() {
    let mut cmd = Command::cargo_bin("stratus").unwrap();
    cmd.arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Declaration is well formed"))
        .stdout(predicate::str::contains("Resources: 4"))
        .stdout(predicate::str::contains("Outputs: 2"));
}

/// destroy without --yes must stop before touching anything.
#[test]
fn test_destroy_requires_confirmation() {
    let mut cmd = Command::cargo_bin("stratus").unwrap();
    cmd.arg("destroy")
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
}

/// outputs with no recorded state says so instead of failing.
#[test]
fn test_outputs_without_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("stratus").unwrap();
    cmd.current_dir(dir.path())
        .arg("outputs")
        .assert()
        .success()
        .stdout(predicate::str::contains("run deploy first"));
}

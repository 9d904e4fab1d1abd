// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! End-to-end CLI checks: compose real configuration files through the
//! binary and inspect the emitted output.

use assert_cmd::Command;
use predicates::prelude::*;

const GOOD_CONFIG: &str = "\
build:
  repo:
    path: org/widget
  steps:
    compile:
      image: golang:1.22
    test:
      depends: [compile]
  traits:
    version: ~
    release: ~
";

const BROKEN_CONFIG: &str = "\
build:
  repo:
    path: org/widget
  steps:
    a:
      depends: [b]
    b:
      depends: [a]
";

fn write_config(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(".jobflow.yaml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn validate_reports_success() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, GOOD_CONFIG);

    Command::cargo_bin("jobflow")
        .unwrap()
        .arg("validate")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("All jobs are valid!"));
}

#[test]
fn validate_reports_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, BROKEN_CONFIG);

    Command::cargo_bin("jobflow")
        .unwrap()
        .arg("validate")
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::contains("cyclic step dependency"));
}

#[test]
fn compile_emits_step_graph_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, GOOD_CONFIG);

    Command::cargo_bin("jobflow")
        .unwrap()
        .arg("compile")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"compile\""))
        .stdout(predicate::str::contains("\"release\""))
        .stdout(predicate::str::contains("\"version_path\""));
}

#[test]
fn graph_emits_mermaid() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, GOOD_CONFIG);

    Command::cargo_bin("jobflow")
        .unwrap()
        .arg("graph")
        .arg(&config)
        .args(["--job", "build", "--format", "mermaid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("graph TD"))
        .stdout(predicate::str::contains("compile --> test"));
}

#[test]
fn missing_config_file_fails_cleanly() {
    Command::cargo_bin("jobflow")
        .unwrap()
        .args(["validate", "/nonexistent/.jobflow.yaml"])
        .assert()
        .failure();
}

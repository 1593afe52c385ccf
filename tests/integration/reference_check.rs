//! reference_check.rs
//!
//! `check`, `doctor` and the failure paths of `add-target` on damaged or
//! ambiguous projects.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

const MAIN_GROUP: &str = "83CBB9F61A601CBA00E9B192";
const BOGUS: &str = "0000000000000000DEADBEEF";

fn fixture_text() -> String {
    let p = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/app/App.xcodeproj/project.pbxproj");
    fs::read_to_string(p).unwrap()
}

fn workspace_with(text: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("App.xcodeproj");
    fs::create_dir_all(&bundle).unwrap();
    fs::write(bundle.join("project.pbxproj"), text).unwrap();
    dir
}

fn descriptor(dir: &TempDir) -> PathBuf {
    dir.path().join("App.xcodeproj/project.pbxproj")
}

fn with_broken_main_group() -> String {
    fixture_text().replace(
        &format!("mainGroup = {MAIN_GROUP};"),
        &format!("mainGroup = {BOGUS};"),
    )
}

fn pbxgraft() -> Command {
    Command::cargo_bin("pbxgraft").unwrap()
}

fn add_target(dir: &TempDir) -> Command {
    let mut cmd = pbxgraft();
    cmd.args(["add-target", "--root"])
        .arg(dir.path())
        .args(["--name", "BroadcastExtension"])
        .args(["--bundle-id", "com.example.BroadcastExtension"])
        .args(["--source", "SampleHandler.swift"])
        .args(["--entitlements", "BroadcastExtension.entitlements"])
        .arg("--yes");
    cmd
}

#[test]
fn clean_fixture_passes_check() {
    let dir = workspace_with(&fixture_text());
    let out = pbxgraft()
        .args(["--json", "check", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["ok"], true);
    assert_eq!(v["dangling"].as_array().unwrap().len(), 0);
}

#[test]
fn check_reports_dangling_reference() {
    let dir = workspace_with(&with_broken_main_group());
    let out = pbxgraft()
        .args(["--json", "check", "--root"])
        .arg(dir.path())
        .assert()
        .code(3)
        .get_output()
        .stdout
        .clone();
    let v: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["ok"], false);
    let dangling = v["dangling"].as_array().unwrap();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0]["field"], "mainGroup");
    assert_eq!(dangling[0]["key"], BOGUS);
}

#[test]
fn add_target_refuses_to_patch_a_missing_node() {
    let text = with_broken_main_group();
    let dir = workspace_with(&text);

    let out = add_target(&dir).assert().code(3).get_output().stderr.clone();
    assert!(String::from_utf8_lossy(&out).contains(BOGUS));
    assert_eq!(fs::read_to_string(descriptor(&dir)).unwrap(), text);
}

#[test]
fn project_stays_consistent_after_add() {
    let dir = workspace_with(&fixture_text());
    add_target(&dir).arg("--host-target").arg("App").assert().success();
    pbxgraft().args(["check", "--root"]).arg(dir.path()).assert().success();
}

#[test]
fn malformed_document_is_left_alone() {
    let text = "// !$*UTF8*$!\n{\n\tobjects = {\n";
    let dir = workspace_with(text);

    let out = add_target(&dir).assert().code(1).get_output().stderr.clone();
    assert!(String::from_utf8_lossy(&out).contains("malformed document"));
    assert_eq!(fs::read_to_string(descriptor(&dir)).unwrap(), text);
}

#[test]
fn doctor_is_happy_with_the_fixture() {
    let dir = workspace_with(&fixture_text());
    let out = pbxgraft()
        .args(["--json", "doctor", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["ok"], true);
    let names: Vec<&str> = v["checks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"references"));
}

#[test]
fn doctor_flags_dangling_references() {
    let dir = workspace_with(&with_broken_main_group());
    pbxgraft().args(["doctor", "--root"]).arg(dir.path()).assert().failure();
}

#[test]
fn two_projects_are_ambiguous() {
    let dir = workspace_with(&fixture_text());
    let other = dir.path().join("Other.xcodeproj");
    fs::create_dir_all(&other).unwrap();
    fs::write(other.join("project.pbxproj"), fixture_text()).unwrap();

    let out = pbxgraft()
        .args(["targets", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&out).contains("--project"));
}

#[test]
fn empty_root_has_no_project() {
    let dir = tempfile::tempdir().unwrap();
    let out = pbxgraft()
        .args(["--json", "targets", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let v: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["ok"], false);
    assert!(v["error"].as_str().unwrap().contains("no *.xcodeproj"));
}

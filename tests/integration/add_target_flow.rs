//! add_target_flow.rs
//!
//! Runs `pbxgraft add-target` against a copy of the fixture app and checks
//! what ends up on disk.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/app")
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let dest = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &dest);
        } else {
            fs::copy(entry.path(), dest).unwrap();
        }
    }
}

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    copy_dir(&fixture_root(), dir.path());
    dir
}

fn descriptor(dir: &TempDir) -> PathBuf {
    dir.path().join("App.xcodeproj/project.pbxproj")
}

fn add_target(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pbxgraft").unwrap();
    cmd.arg("add-target")
        .arg("--root")
        .arg(dir.path())
        .args(["--name", "BroadcastExtension"])
        .args(["--bundle-id", "com.example.App.BroadcastExtension"])
        .args(["--source", "BroadcastExtension/SampleHandler.swift"])
        .args(["--entitlements", "BroadcastExtension/BroadcastExtension.entitlements"])
        .args(["--seed", "7"]);
    cmd
}

fn json(stdout: &[u8]) -> Value {
    serde_json::from_slice(stdout).expect("stdout is JSON")
}

#[test]
fn creates_and_embeds_extension() {
    let dir = workspace();
    let out = add_target(&dir)
        .args(["--framework", "ReplayKit", "--host-target", "App", "--check-files", "--yes", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v = json(&out);
    assert_eq!(v["result"]["outcome"], "created");
    assert_eq!(v["result"]["embeddedIn"], "App");
    assert_eq!(v["written"], true);
    assert_eq!(v["dryRun"], false);
    assert!(v["guidance"].as_array().is_some_and(|g| !g.is_empty()));

    let text = fs::read_to_string(descriptor(&dir)).unwrap();
    assert!(text.starts_with("// !$*UTF8*$!"));
    assert!(text.contains("BroadcastExtension.appex"));
    assert!(text.contains("Embed Foundation Extensions"));
    assert!(text.contains("ReplayKit.framework in Frameworks"));
    assert!(text.contains("SampleHandler.swift in Sources"));
    assert!(text.contains("CODE_SIGN_ENTITLEMENTS = BroadcastExtension/BroadcastExtension.entitlements;"));
}

#[test]
fn human_output_lists_next_steps() {
    let dir = workspace();
    let out = add_target(&dir).arg("--yes").assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("BroadcastExtension"));
    assert!(text.contains("Next steps:"));
    assert!(text.contains("App Groups"));
}

#[test]
fn declined_prompt_leaves_file_untouched() {
    let dir = workspace();
    let before = fs::read(descriptor(&dir)).unwrap();

    add_target(&dir).write_stdin("no\n").assert().code(4);

    assert_eq!(fs::read(descriptor(&dir)).unwrap(), before);
}

#[test]
fn closed_stdin_counts_as_no() {
    let dir = workspace();
    let before = fs::read(descriptor(&dir)).unwrap();
    add_target(&dir).write_stdin("").assert().code(4);
    assert_eq!(fs::read(descriptor(&dir)).unwrap(), before);
}

#[test]
fn accepted_prompt_writes() {
    let dir = workspace();
    let before = fs::read(descriptor(&dir)).unwrap();
    add_target(&dir).write_stdin("yes\n").assert().success();
    assert_ne!(fs::read(descriptor(&dir)).unwrap(), before);
}

#[test]
fn missing_host_fails_without_writing() {
    let dir = workspace();
    let before = fs::read(descriptor(&dir)).unwrap();

    let out = add_target(&dir)
        .args(["--host-target", "Nope", "--yes"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&out).contains("host target not found: Nope"));
    assert_eq!(fs::read(descriptor(&dir)).unwrap(), before);
}

#[test]
fn check_files_rejects_missing_sources() {
    let dir = workspace();
    let before = fs::read(descriptor(&dir)).unwrap();

    let out = add_target(&dir)
        .args(["--source", "BroadcastExtension/Missing.swift", "--check-files", "--yes"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&out).contains("Missing.swift"));
    assert_eq!(fs::read(descriptor(&dir)).unwrap(), before);
}

#[test]
fn dry_run_reports_without_writing() {
    let dir = workspace();
    let before = fs::read(descriptor(&dir)).unwrap();

    let out = add_target(&dir)
        .args(["--dry-run", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v = json(&out);
    assert_eq!(v["dryRun"], true);
    assert_eq!(v["written"], false);
    assert_eq!(v["result"]["outcome"], "created");
    assert_ne!(v["digestBefore"], v["digestAfter"]);
    assert_eq!(fs::read(descriptor(&dir)).unwrap(), before);
}

#[test]
fn backup_keeps_the_previous_document() {
    let dir = workspace();
    let before = fs::read(descriptor(&dir)).unwrap();

    let out = add_target(&dir)
        .args(["--backup", "--yes", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v = json(&out);
    let backup = PathBuf::from(v["backup"].as_str().expect("backup path reported"));
    assert_eq!(fs::read(backup).unwrap(), before);
}

#[test]
fn explicit_project_path_accepts_the_bundle() {
    let dir = workspace();
    Command::cargo_bin("pbxgraft")
        .unwrap()
        .arg("add-target")
        .arg("--project")
        .arg(dir.path().join("App.xcodeproj"))
        .args(["--name", "Shared", "--product-type", "framework"])
        .args(["--bundle-id", "com.example.Shared"])
        .args(["--source", "Shared/Shared.swift"])
        .args(["--entitlements", "Shared/Shared.entitlements"])
        .args(["--setting", "SWIFT_VERSION=5.9", "--yes"])
        .assert()
        .success();

    let text = fs::read_to_string(descriptor(&dir)).unwrap();
    assert!(text.contains("Shared.framework"));
    assert!(text.contains("com.apple.product-type.framework"));
    assert!(text.contains("SWIFT_VERSION = 5.9;"));
}

#[test]
fn missing_required_flags_are_reported() {
    let dir = workspace();
    let out = Command::cargo_bin("pbxgraft")
        .unwrap()
        .arg("add-target")
        .arg("--root")
        .arg(dir.path())
        .args(["--name", "X", "--yes"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&out).contains("--bundle-id is required"));
}

//! idempotency_roundtrip.rs
//!
//! A second `add-target` with the same name is a successful no-op and the
//! descriptor stays byte-for-byte identical.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

fn fixture_descriptor() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/app/App.xcodeproj/project.pbxproj")
}

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("App.xcodeproj");
    fs::create_dir_all(&bundle).unwrap();
    fs::copy(fixture_descriptor(), bundle.join("project.pbxproj")).unwrap();
    dir
}

fn descriptor(dir: &TempDir) -> PathBuf {
    dir.path().join("App.xcodeproj/project.pbxproj")
}

fn pbxgraft(subcommand: &str, root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pbxgraft").unwrap();
    cmd.arg("--json").arg(subcommand).arg("--root").arg(root);
    cmd
}

fn add(dir: &TempDir, seed: &str) -> Value {
    let out = Command::cargo_bin("pbxgraft")
        .unwrap()
        .args(["--json", "add-target", "--root"])
        .arg(dir.path())
        .args(["--name", "BroadcastExtension"])
        .args(["--bundle-id", "com.example.BroadcastExtension"])
        .args(["--source", "SampleHandler.ext"])
        .args(["--entitlements", "Entitlements.plist"])
        .args(["--host-target", "App", "--yes", "--seed", seed])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn second_add_is_a_byte_identical_no_op() {
    let dir = workspace();

    let first = add(&dir, "1");
    assert_eq!(first["result"]["outcome"], "created");
    let after_first = fs::read(descriptor(&dir)).unwrap();

    let second = add(&dir, "2");
    assert_eq!(second["result"]["outcome"], "already_exists");
    assert_eq!(second["result"]["target"], first["result"]["target"]);
    assert_eq!(second["written"], false);
    assert_eq!(second["digestBefore"], first["digestAfter"]);
    assert_eq!(second["digestAfter"], first["digestAfter"]);

    assert_eq!(fs::read(descriptor(&dir)).unwrap(), after_first);
}

#[test]
fn targets_lists_the_new_target_once() {
    let dir = workspace();
    add(&dir, "3");
    add(&dir, "4");

    let out = pbxgraft("targets", dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: Value = serde_json::from_slice(&out).unwrap();
    let names: Vec<&str> = v
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["App", "BroadcastExtension"]);
    assert_eq!(v[1]["productType"], "com.apple.product-type.app-extension");
}

#[test]
fn spec_file_drives_the_same_edit() {
    let dir = workspace();
    let spec = dir.path().join("target.json");
    fs::write(
        &spec,
        r#"{
  "name": "BroadcastExtension",
  "productType": "app-extension",
  "bundleId": "com.example.BroadcastExtension",
  "sources": ["SampleHandler.ext"],
  "entitlements": "Entitlements.plist",
  "hostTarget": "App"
}"#,
    )
    .unwrap();

    let out = Command::cargo_bin("pbxgraft")
        .unwrap()
        .args(["--json", "add-target", "--root"])
        .arg(dir.path())
        .arg("--spec")
        .arg(&spec)
        .args(["--yes", "--seed", "5"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["result"]["outcome"], "created");

    let again = add(&dir, "6");
    assert_eq!(again["result"]["outcome"], "already_exists");
}

#[test]
fn rewritten_document_is_stable_under_reserialization() {
    let dir = workspace();
    add(&dir, "8");
    let first = fs::read(descriptor(&dir)).unwrap();

    // A different target forces a full rewrite; the lines that belonged to
    // the first edit must come back unchanged.
    Command::cargo_bin("pbxgraft")
        .unwrap()
        .args(["add-target", "--root"])
        .arg(dir.path())
        .args(["--name", "Widgets", "--bundle-id", "com.example.Widgets"])
        .args(["--source", "Widgets/Widgets.swift", "--entitlements", "Widgets/Widgets.entitlements"])
        .args(["--yes", "--seed", "9"])
        .assert()
        .success();

    let second = String::from_utf8(fs::read(descriptor(&dir)).unwrap()).unwrap();
    for line in String::from_utf8(first).unwrap().lines() {
        if line.contains("SampleHandler.ext") {
            assert!(second.contains(line), "missing line after rewrite: {line}");
        }
    }
}

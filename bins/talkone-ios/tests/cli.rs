//! End-to-end tests driving the binary against fake flutter/xcodebuild scripts

#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_FLUTTER: &str = r#"#!/bin/sh
echo "flutter $*" >> "$FAKE_LOG"
exit 0
"#;

const FAKE_XCODEBUILD: &str = r#"#!/bin/sh
echo "xcodebuild $*" >> "$FAKE_LOG"
case "$*" in
  *-exportArchive*) exit 0 ;;
esac
exit "${FAKE_ARCHIVE_EXIT:-0}"
"#;

/// Temporary project with fake tools and a config pointing at them
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("app/ios")).unwrap();
        fs::create_dir_all(root.join("Desktop")).unwrap();
        fs::create_dir_all(root.join("bin")).unwrap();

        let flutter = write_script(&root.join("bin/flutter"), FAKE_FLUTTER);
        let xcodebuild = write_script(&root.join("bin/xcodebuild"), FAKE_XCODEBUILD);

        let config = format!(
            r#"
[project]
root = "{root}"

[tools]
flutter = "{flutter}"
xcodebuild = "{xcodebuild}"

[archive]
development_team = "658363YSD7"

[publish]
destination_dir = "{desktop}"
artifact_name = "TalkOne_v0.9.1_iOS_20250703.ipa"
"#,
            root = root.join("app").display(),
            flutter = flutter.display(),
            xcodebuild = xcodebuild.display(),
            desktop = root.join("Desktop").display(),
        );
        fs::write(root.join("talkone.toml"), config).unwrap();

        Self { dir }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn exported_ipa(&self) -> PathBuf {
        self.path("app/build/ipa/Runner.ipa")
    }

    fn destination(&self) -> PathBuf {
        self.path("Desktop/TalkOne_v0.9.1_iOS_20250703.ipa")
    }

    fn log(&self) -> String {
        fs::read_to_string(self.path("calls.log")).unwrap_or_default()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("talkone-ios").unwrap();
        cmd.arg("--config")
            .arg(self.path("talkone.toml"))
            .arg("--no-color")
            .env("FAKE_LOG", self.path("calls.log"))
            .env_remove("RUST_LOG")
            .env_remove("TALKONE_CONFIG");
        cmd
    }
}

fn write_script(path: &Path, body: &str) -> PathBuf {
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_path_buf()
}

fn write_sized(path: &Path, len: u64) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::File::create(path).unwrap().set_len(len).unwrap();
}

#[test]
fn build_runs_all_stages_and_publishes() {
    let fx = Fixture::new();
    write_sized(&fx.exported_ipa(), 10_485_760);

    fx.cmd()
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("[1/6] Cleaning previous builds..."))
        .stdout(predicate::str::contains("[6/6]"))
        .stdout(predicate::str::contains("IPA build complete!"))
        .stdout(predicate::str::contains("10485760 bytes"));

    assert_eq!(fs::metadata(fx.destination()).unwrap().len(), 10_485_760);

    let log = fx.log();
    let calls: Vec<&str> = log.lines().collect();
    assert_eq!(calls.len(), 5);
    assert_eq!(calls[0], "flutter clean");
    assert_eq!(calls[1], "flutter pub get");
    assert_eq!(calls[2], "flutter build ios --release");
    assert!(calls[3].contains(" archive DEVELOPMENT_TEAM=658363YSD7"));
    assert!(calls[4].starts_with("xcodebuild -exportArchive"));
}

#[test]
fn archive_failure_skips_export_and_exits_non_zero() {
    let fx = Fixture::new();
    write_sized(&fx.exported_ipa(), 1024);

    fx.cmd()
        .env("FAKE_ARCHIVE_EXIT", "2")
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("archive"))
        .stderr(predicate::str::contains("exit code 2"));

    let log = fx.log();
    assert_eq!(log.lines().count(), 4);
    assert!(!log.contains("-exportArchive"));
    assert!(!fx.destination().exists());
}

#[test]
fn build_log_and_continue_exits_zero_on_failure() {
    let fx = Fixture::new();

    fx.cmd()
        .env("FAKE_ARCHIVE_EXIT", "2")
        .args(["--on-failure", "log-and-continue", "build"])
        .assert()
        .success()
        .stderr(predicate::str::contains("IPA build failed"));

    assert!(!fx.log().contains("-exportArchive"));
}

#[test]
fn build_without_exported_package_reports_missing_source() {
    let fx = Fixture::new();

    fx.cmd()
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source not found"));

    assert_eq!(fx.log().lines().count(), 5);
}

#[test]
fn publish_missing_source_still_exits_zero() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["publish", "--source"])
        .arg(fx.path("nowhere/TalkOne.ipa"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Error copying IPA"))
        .stderr(predicate::str::contains("Source not found"));

    assert!(fx.log().is_empty());
}

#[test]
fn publish_with_propagate_policy_fails() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["--on-failure", "propagate", "publish", "--source"])
        .arg(fx.path("nowhere/TalkOne.ipa"))
        .assert()
        .failure();
}

#[test]
fn publish_copies_existing_source() {
    let fx = Fixture::new();
    let source = fx.path("app/build/ios/iphoneos/TalkOne.ipa");
    write_sized(&source, 2048);

    fx.cmd()
        .args(["publish", "--source"])
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully copied IPA to"))
        .stdout(predicate::str::contains("2048 bytes"));

    assert_eq!(fs::read(fx.destination()).unwrap(), fs::read(&source).unwrap());
}

#[test]
fn publish_into_missing_destination_reports_copy_failure() {
    let fx = Fixture::new();
    write_sized(&fx.exported_ipa(), 16);

    fx.cmd()
        .arg("--destination")
        .arg(fx.path("no/such/dir"))
        .arg("publish")
        .assert()
        .success()
        .stderr(predicate::str::contains("Copy failed"));
}

#[test]
fn publish_onto_source_is_refused_and_source_kept() {
    let fx = Fixture::new();
    write_sized(&fx.exported_ipa(), 4096);

    fx.cmd()
        .arg("--destination")
        .arg(fx.path("app/build/ipa"))
        .args(["--artifact-name", "Runner.ipa", "publish"])
        .assert()
        .success()
        .stderr(predicate::str::contains("same file"));

    assert_eq!(fs::metadata(fx.exported_ipa()).unwrap().len(), 4096);
}

#[test]
fn no_color_output_has_no_escape_codes() {
    let fx = Fixture::new();
    write_sized(&fx.exported_ipa(), 64);

    for args in [&["build"][..], &["plan"], &["doctor"]] {
        let output = fx.cmd().args(args).output().unwrap();
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        assert!(!stdout.contains('\x1b'), "{:?}: {}", args, stdout);
        assert!(!stderr.contains('\x1b'), "{:?}: {}", args, stderr);
    }

    let output = fx
        .cmd()
        .env("FAKE_ARCHIVE_EXIT", "2")
        .arg("build")
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("exit code 2"));
    assert!(!stderr.contains('\x1b'), "{}", stderr);
}

#[test]
fn dry_run_executes_nothing() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["build", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 stages planned"));

    assert!(fx.log().is_empty());
}

#[test]
fn plan_json_lists_stages() {
    let fx = Fixture::new();

    let output = fx.cmd().args(["plan", "--json"]).output().unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = plan["stages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();

    assert_eq!(names, ["clean", "pub-get", "build", "archive", "export"]);
    assert_eq!(plan["policy"]["publish"], "log-and-continue");
}

#[test]
fn missing_config_file_is_config_error() {
    Command::cargo_bin("talkone-ios")
        .unwrap()
        .args(["--config", "/nonexistent/talkone.toml", "plan"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Configuration file not found"));
}

//! End-to-end tests for the dnvm binary
//!
//! Every test runs the built executable against an isolated managed home and
//! user home, without network access.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MANIFEST: &str = r#"{
  "version": 3,
  "currentSdkDir": "sts",
  "installedSdkVersions": [
    { "version": "8.0.303", "sdkDirName": "dn" },
    { "version": "9.0.100", "sdkDirName": "sts" }
  ],
  "trackedChannels": [
    { "channelName": "lts", "sdkDirName": "dn", "installedSdkVersions": ["8.0.303"] },
    { "channelName": "sts", "sdkDirName": "sts", "installedSdkVersions": ["9.0.100"] }
  ]
}"#;

struct Sandbox {
    temp: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("user")).unwrap();
        fs::create_dir_all(temp.path().join("dnvm")).unwrap();
        Self { temp }
    }

    fn home(&self) -> &Path {
        self.temp.path()
    }

    fn dnvm_home(&self) -> std::path::PathBuf {
        self.home().join("dnvm")
    }

    fn with_manifest(self, text: &str) -> Self {
        fs::write(self.dnvm_home().join("dnvmManifest.json"), text).unwrap();
        self
    }

    fn run(&self, args: &[&str]) -> Output {
        self.run_exe(Path::new(env!("CARGO_BIN_EXE_dnvm")), args)
    }

    fn run_exe(&self, exe: &Path, args: &[&str]) -> Output {
        Command::new(exe)
            .args(args)
            .env("DNVM_HOME", self.dnvm_home())
            .env("HOME", self.home().join("user"))
            .env_remove("DNVM_FEED_URL")
            .env_remove("DNVM_RELEASES_URL")
            .env_remove("DNVM_HTTP_TIMEOUT_SECS")
            .output()
            .expect("Failed to run dnvm")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_version_flag_names_the_tool() {
    let output = Sandbox::new().run(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("dnvm "));
}

#[test]
fn test_version_json() {
    let output = Sandbox::new().run(&["version", "--json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["manifestSchema"], 3);
}

#[test]
fn test_version_text_names_rid() {
    let output = Sandbox::new().run(&["version"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with(&format!("dnvm {}", env!("CARGO_PKG_VERSION"))));
    assert!(out.contains("Runtime identifier: "));
}

#[test]
fn test_list_without_manifest() {
    let output = Sandbox::new().run(&["list"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("No SDKs installed"));
}

#[test]
fn test_list_shows_installed_sdks() {
    let output = Sandbox::new().with_manifest(MANIFEST).run(&["list"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Location"));
    assert!(out.contains("8.0.303"));
    assert!(out.contains("9.0.100"));
    assert!(out.contains("Installed SDKs:"));
    assert!(out.contains("│ lts "));
}

#[test]
fn test_corrupt_manifest_exits_with_one() {
    let output = Sandbox::new().with_manifest("{ not json").run(&["list"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("corrupt"));
}

#[test]
fn test_future_manifest_schema_exits_with_one() {
    let output = Sandbox::new()
        .with_manifest(r#"{ "version": 99, "installedSdkVersions": [] }"#)
        .run(&["list"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_select_unknown_dir_lists_valid_dirs() {
    let output = Sandbox::new().with_manifest(MANIFEST).run(&["select", "nightly"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Installed directories: dn, sts"));
}

#[test]
fn test_select_switches_current_dir() {
    let sandbox = Sandbox::new().with_manifest(MANIFEST);
    let output = sandbox.run(&["select", "dn"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let text = fs::read_to_string(sandbox.dnvm_home().join("dnvmManifest.json")).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(manifest["currentSdkDir"], "dn");
    assert_eq!(manifest["version"], 3);
}

#[test]
fn test_invalid_channel_is_rejected() {
    let output = Sandbox::new().run(&["install", "8.x"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid channel"));
}

#[test]
fn test_update_self_requires_installed_dnvm() {
    let output = Sandbox::new().run(&["update", "--self", "--yes"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("self-install"));
}

#[test]
fn test_self_install_from_renamed_binary_is_refused_first() {
    let sandbox = Sandbox::new().with_manifest(MANIFEST);
    let exe_name = format!("dnvm{}", std::env::consts::EXE_SUFFIX);
    fs::write(sandbox.dnvm_home().join(&exe_name), "installed").unwrap();

    let renamed = sandbox
        .home()
        .join(format!("sdk-tool{}", std::env::consts::EXE_SUFFIX));
    fs::copy(env!("CARGO_BIN_EXE_dnvm"), &renamed).unwrap();

    let output = sandbox.run_exe(&renamed, &["self-install", "--yes"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("not a self-contained dnvm executable"), "{}", err);
    assert!(!err.contains("already installed"), "{}", err);
    assert_eq!(
        fs::read_to_string(sandbox.dnvm_home().join(&exe_name)).unwrap(),
        "installed"
    );
}

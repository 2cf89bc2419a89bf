//! Integration tests for extpack

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated home and config file for one test
struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    fn new() -> Option<Self> {
        TempDir::new().ok().map(|home| Sandbox { home })
    }

    fn config_path(&self) -> PathBuf {
        self.home.path().join("extpack.toml")
    }

    fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("extpack");
        cmd.env("EXTPACK_CONFIG", self.config_path())
            .env("HOME", self.home.path())
            .env_remove("RUST_LOG");
        cmd
    }
}

fn write_file(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let _ = fs::write(path, content);
}

fn extension_project() -> Option<TempDir> {
    let project = TempDir::new().ok()?;
    let root = project.path();
    write_file(
        root,
        "package.json",
        r#"{
  "name": "tab-notes",
  "displayName": "Tab Notes",
  "version": "1.4.0",
  "description": "Notes for every tab",
  "manifest": { "permissions": ["storage"] }
}"#,
    );
    write_file(root, "src/popup/index.tsx", "export {}\n");
    write_file(root, "src/background.ts", "export {}\n");
    write_file(root, "src/contents/highlight.ts", "export {}\n");
    Some(project)
}

fn read_manifest(path: &Path) -> Value {
    fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or(Value::Null)
}

#[test]
fn test_version() {
    let Some(sandbox) = Sandbox::new() else {
        return;
    };
    sandbox
        .command()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("extpack"));
}

#[test]
fn test_help() {
    let Some(sandbox) = Sandbox::new() else {
        return;
    };
    sandbox
        .command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("writes its manifest.json"));
}

#[test]
fn test_invalid_command() {
    let Some(sandbox) = Sandbox::new() else {
        return;
    };
    sandbox.command().arg("invalid").assert().failure();
}

#[test]
fn test_build_default_target() {
    let (Some(sandbox), Some(project)) = (Sandbox::new(), extension_project()) else {
        return;
    };
    sandbox
        .command()
        .arg("build")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("chrome-mv3"));

    let manifest = read_manifest(&project.path().join("build/chrome-mv3/manifest.json"));
    assert_eq!(manifest["manifest_version"], 3);
    assert_eq!(manifest["name"], "Tab Notes");
    assert_eq!(manifest["version"], "1.4.0");
    assert_eq!(manifest["action"]["default_popup"], "popup.html");
    assert_eq!(manifest["background"]["service_worker"], "background.js");
    assert_eq!(manifest["content_scripts"][0]["js"][0], "contents/highlight.js");
    assert_eq!(manifest["permissions"][0], "storage");
    assert!(project.path().join(".extpack/popup.html").exists());
}

#[test]
fn test_build_mv2_flag() {
    let (Some(sandbox), Some(project)) = (Sandbox::new(), extension_project()) else {
        return;
    };
    sandbox
        .command()
        .args(["build", "--manifest-version", "mv2"])
        .arg(project.path())
        .assert()
        .success();

    let manifest = read_manifest(&project.path().join("build/chrome-mv2/manifest.json"));
    assert_eq!(manifest["manifest_version"], 2);
    assert_eq!(manifest["browser_action"]["default_popup"], "popup.html");
    assert_eq!(manifest["background"]["persistent"], false);
    assert!(manifest.get("host_permissions").is_none());
}

#[test]
fn test_build_firefox_target() {
    let (Some(sandbox), Some(project)) = (Sandbox::new(), extension_project()) else {
        return;
    };
    sandbox
        .command()
        .args(["build", "--target", "firefox-mv3"])
        .arg(project.path())
        .assert()
        .success();

    let manifest = read_manifest(&project.path().join("build/firefox-mv3/manifest.json"));
    assert_eq!(manifest["background"]["scripts"][0], "background.js");
    assert!(manifest["background"].get("service_worker").is_none());
}

#[test]
fn test_build_conflicting_target_flags() {
    let Some(sandbox) = Sandbox::new() else {
        return;
    };
    sandbox
        .command()
        .args(["build", "--target", "chrome-mv3", "--browser", "edge"])
        .assert()
        .failure();
}

#[test]
fn test_build_without_package_json_fails() {
    let (Some(sandbox), Ok(project)) = (Sandbox::new(), TempDir::new()) else {
        return;
    };
    write_file(project.path(), "popup.tsx", "export {}\n");
    sandbox
        .command()
        .arg("build")
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("package.json"));
    assert!(!project.path().join("build").exists());
}

#[test]
fn test_probe_reports_features() {
    let (Some(sandbox), Some(project)) = (Sandbox::new(), extension_project()) else {
        return;
    };
    sandbox
        .command()
        .arg("probe")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("popup"))
        .stdout(predicate::str::contains("enabled"))
        .stdout(predicate::str::contains("background.ts"))
        .stdout(predicate::str::contains("highlight.ts"));
    assert!(!project.path().join("build").exists());
}

#[test]
fn test_config_show() {
    let Some(sandbox) = Sandbox::new() else {
        return;
    };
    sandbox
        .command()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration:"));
}

#[test]
fn test_config_set_then_show() {
    let Some(sandbox) = Sandbox::new() else {
        return;
    };
    sandbox
        .command()
        .args(["config", "set", "browser", "firefox"])
        .assert()
        .success();
    sandbox
        .command()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("firefox"));
}

#[test]
fn test_config_set_unknown_key() {
    let Some(sandbox) = Sandbox::new() else {
        return;
    };
    sandbox
        .command()
        .args(["config", "set", "cache-path", "/tmp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Supported keys"));
}

#[test]
fn test_config_path() {
    let Some(sandbox) = Sandbox::new() else {
        return;
    };
    sandbox
        .command()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extpack.toml"));
}

#[test]
fn test_configured_browser_is_used_by_build() {
    let (Some(sandbox), Some(project)) = (Sandbox::new(), extension_project()) else {
        return;
    };
    sandbox
        .command()
        .args(["config", "set", "browser", "edge"])
        .assert()
        .success();
    sandbox
        .command()
        .arg("build")
        .arg(project.path())
        .assert()
        .success();
    assert!(project.path().join("build/edge-mv3/manifest.json").exists());
}

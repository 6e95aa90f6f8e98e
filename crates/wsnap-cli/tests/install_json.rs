//! Integration tests for `wsnap install --json` output.

use std::fs;
use std::process::Command;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "wsnap-cli", "--bin", "wsnap", "--"]);
    cmd
}

fn write(path: &std::path::Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).expect("failed to create parent dir");
    fs::write(path, contents).expect("failed to write fixture file");
}

fn fixture_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let root = dir.path();

    write(
        &root.join("node_modules/tiny-lib/package.json"),
        r#"{"name":"tiny-lib","version":"1.0.0","main":"index.js"}"#,
    );
    write(
        &root.join("node_modules/tiny-lib/index.js"),
        "export function greet() { return 'hi'; }\n",
    );
    write(
        &root.join("app.js"),
        "import { greet } from 'tiny-lib';\nconsole.log(greet());\n",
    );

    dir
}

#[test]
fn test_install_json_is_valid_json() {
    let project = fixture_project();

    let output = cargo_bin()
        .args(["--json", "--cwd"])
        .arg(project.path())
        .arg("install")
        .output()
        .expect("failed to run install command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("stdout was not valid JSON");

    assert!(json.get("success").is_some());
    assert!(json.get("hasError").is_some());
    assert!(json.get("importMap").is_some());
    assert!(json.get("stats").is_some());
    assert!(json.get("errors").is_some());
}

#[test]
fn test_install_json_resolves_known_dependency() {
    let project = fixture_project();

    let output = cargo_bin()
        .args(["--json", "--cwd"])
        .arg(project.path())
        .arg("install")
        .output()
        .expect("failed to run install command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("stdout was not valid JSON");

    assert_eq!(json["success"], true);
    let import_map = json["importMap"]
        .as_object()
        .expect("importMap should be an object");
    assert!(
        import_map.contains_key("tiny-lib"),
        "expected tiny-lib to be resolved, got: {import_map:?}"
    );

    let stats = &json["stats"];
    assert_eq!(stats["filesScanned"].as_u64().unwrap(), 1);
    assert_eq!(stats["targetsFound"].as_u64().unwrap(), 1);
    assert_eq!(stats["targetsBundled"].as_u64().unwrap(), 1);

    assert!(project.path().join("web_modules/import-map.json").exists());
}

#[test]
fn test_install_dest_flag_changes_output_directory() {
    let project = fixture_project();

    let output = cargo_bin()
        .args(["--json", "--cwd"])
        .arg(project.path())
        .args(["install", "--dest", "vendor"])
        .output()
        .expect("failed to run install command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("stdout was not valid JSON");

    assert_eq!(json["success"], true);
    assert!(project.path().join("vendor/import-map.json").exists());
    assert!(!project.path().join("web_modules").exists());
}

//! End-to-end tests driving the `sq` binary against temporary packages

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Path to the compiled sq binary
fn sq_bin() -> String {
    env!("CARGO_BIN_EXE_sq").to_string()
}

/// Run `sq -p <dir> <args>` and return (stdout, stderr, exit code).
fn run_sq(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(sq_bin())
        .arg("-p")
        .arg(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute sq with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn package() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "squashpack.yml", "name: elwood\nschema: app\n");
    write(temp.path(), "elwood.control", "default_version = '0.0.0'\n");
    write(temp.path(), "migrations/v0.1.0/001_schema.sql", "CREATE SCHEMA a;\n");
    write(
        temp.path(),
        "migrations/v0.1.0/002_node.sql",
        "CREATE TABLE a.node(id uuid);\n",
    );
    temp
}

#[test]
fn test_compile_prints_bundle() {
    let temp = package();
    let (stdout, _, code) = run_sq(temp.path(), &["compile"]);
    assert_eq!(code, 0);
    assert_eq!(
        stdout,
        "-- src:001_schema\nCREATE SCHEMA a;\n--\n\n-- src:002_node\nCREATE TABLE a.node(id uuid);\n--\n\n"
    );
}

#[test]
fn test_compile_to_file() {
    let temp = package();
    let out = temp.path().join("build/bundle.sql");
    let (stdout, _, code) = run_sq(temp.path(), &["compile", "--output", out.to_str().unwrap()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Wrote 2 migrations"));
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("-- src:001_schema\n"));
}

#[test]
fn test_compile_failure_reports_category() {
    let temp = package();
    write(
        temp.path(),
        "migrations/v0.1.0/003_broken.yml",
        "up:\n  - create_table: { name: empty, columns: [] }\n",
    );
    let (_, stderr, code) = run_sq(temp.path(), &["compile"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("[C001]"), "stderr: {stderr}");
    assert!(stderr.contains("003_broken"));
}

#[test]
fn test_release_then_nothing_to_release() {
    let temp = package();
    let (stdout, _, code) = run_sq(temp.path(), &["release"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Released 0.1.0 (previous 0.0.0)"));
    assert!(temp.path().join("versions/0.1.0.json").exists());
    assert!(temp.path().join("versions/latest.json").exists());
    assert!(temp.path().join("elwood--0.1.0.sql").exists());
    assert_eq!(
        fs::read_to_string(temp.path().join("elwood.control")).unwrap(),
        "default_version = '0.1.0'\n"
    );

    let (_, stderr, code) = run_sq(temp.path(), &["release"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("[R001] Nothing to release"));
    assert!(stderr.contains("since 0.1.0"));
}

#[test]
fn test_release_dry_run_writes_nothing() {
    let temp = package();
    let (stdout, _, code) = run_sq(temp.path(), &["release", "--dry-run", "--bump", "patch"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Would release 0.0.1"));
    assert!(stdout.contains("+ 002_node"));
    assert!(!temp.path().join("versions").exists());
    assert_eq!(
        fs::read_to_string(temp.path().join("elwood.control")).unwrap(),
        "default_version = '0.0.0'\n"
    );
}

#[test]
fn test_status_lists_pending() {
    let temp = package();
    run_sq(temp.path(), &["release"]);
    write(
        temp.path(),
        "migrations/v0.2.0/001_member.sql",
        "CREATE TABLE a.member(id uuid);\n",
    );

    let (stdout, _, code) = run_sq(temp.path(), &["status", "--output", "json"]);
    assert_eq!(code, 0);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["default_version"], "0.1.0");
    assert_eq!(status["latest_release"], "0.1.0");
    assert_eq!(status["released"], 2);
    assert_eq!(status["pending"], serde_json::json!(["001_member"]));
}

#[test]
fn test_ls_json() {
    let temp = package();
    write(
        temp.path(),
        "migrations/v0.1.0/003_view.sql",
        "-- migrate:up\nSELECT 1;\n-- migrate:down\nSELECT 2;\n",
    );
    let (stdout, _, code) = run_sq(temp.path(), &["ls", "--output", "json"]);
    assert_eq!(code, 0);
    let modules: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    let names: Vec<&str> = modules.iter().map(|m| m["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["001_schema", "002_node", "003_view"]);
    assert_eq!(modules[2]["has_down"], true);
    assert_eq!(modules[0]["folder"], "v0.1.0");
}

#[test]
fn test_init_scaffolds_releasable_package() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("pkg");
    fs::create_dir(&dir).unwrap();

    let (_, _, code) = run_sq(&dir, &["init", "--name", "elwood"]);
    assert_eq!(code, 0);
    assert!(dir.join("squashpack.yml").exists());
    assert!(dir.join("elwood.control").exists());
    let example = fs::read_to_string(dir.join("migrations/v0.1.0/001_schema.sql")).unwrap();
    assert!(example.contains("{% raw %}"));

    let (stdout, _, code) = run_sq(&dir, &["compile"]);
    assert_eq!(code, 0);
    assert_eq!(
        stdout,
        "-- src:001_schema\nCREATE SCHEMA IF NOT EXISTS \"elwood\";\n--\n\n"
    );

    let (_, stderr, code) = run_sq(&dir, &["init", "--name", "elwood"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("already exists"));
}

#[test]
fn test_missing_project_fails() {
    let temp = TempDir::new().unwrap();
    let (_, stderr, code) = run_sq(temp.path(), &["ls"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Failed to load project"));
}

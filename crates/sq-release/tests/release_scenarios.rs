use sq_compile::{Compiler, MigrationRegistry};
use sq_core::{ControlRecord, MigrationName, Project, ReleaseArtifact, ReleaseType, SemVer};
use sq_release::{ReleaseError, ReleasePlan, ReleaseTracker};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn new_project(default_version: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "squashpack.yml", "name: elwood\n");
    write(
        temp.path(),
        "elwood.control",
        &format!("comment = 'elwood'\ndefault_version = '{default_version}'\nrelocatable = false\n"),
    );
    write(temp.path(), "migrations/v0.1.0/001_schema.sql", "CREATE SCHEMA a;\n");
    write(
        temp.path(),
        "migrations/v0.1.0/002_node.sql",
        "CREATE TABLE a.node(id uuid);\n",
    );
    temp
}

fn release(
    root: &Path,
    configure: impl FnOnce(ReleaseTracker) -> ReleaseTracker,
) -> Result<ReleasePlan, ReleaseError> {
    let project = Project::load(root).unwrap();
    let registry = MigrationRegistry::from_project(&project)?;
    let bundle = Compiler::for_project(&project).compile(&registry)?;
    configure(ReleaseTracker::from_project(&project)).release(&bundle)
}

fn artifact(root: &Path, file: &str) -> ReleaseArtifact {
    ReleaseArtifact::load(&root.join("versions").join(file))
        .unwrap()
        .unwrap()
}

fn control_version(root: &Path) -> SemVer {
    ControlRecord::load(&root.join("elwood.control"))
        .unwrap()
        .default_version()
        .clone()
}

/// Every file under the project root with its contents, for before/after comparisons
fn snapshot(root: &Path) -> Vec<(String, String)> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<(String, String)>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(&path, root, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().display().to_string();
                out.push((rel, fs::read_to_string(&path).unwrap()));
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

#[test]
fn incremental_release_contains_only_the_delta() {
    let temp = new_project("0.9.0");
    let root = temp.path();

    let first = release(root, |t| t.bump(ReleaseType::Major)).unwrap();
    assert_eq!(first.version, SemVer::new(1, 0, 0));
    assert_eq!(
        artifact(root, "1.0.0.json").sql,
        "-- src:001_schema\nCREATE SCHEMA a;\n--\n\n-- src:002_node\nCREATE TABLE a.node(id uuid);\n--\n\n"
    );

    write(
        root,
        "migrations/v0.1.1/001_extra.sql",
        "ALTER TABLE a.node ADD COLUMN name text;\n",
    );
    let second = release(root, |t| t).unwrap();
    assert_eq!(second.version, SemVer::new(1, 1, 0));

    let released = artifact(root, "1.1.0.json");
    assert_eq!(released.migrations, vec!["001_schema", "002_node", "001_extra"]);
    assert_eq!(
        released.sql,
        "-- src:001_extra\nALTER TABLE a.node ADD COLUMN name text;\n--\n\n"
    );
    assert_eq!(artifact(root, "latest.json"), released);
    assert_eq!(control_version(root), SemVer::new(1, 1, 0));

    // The install script carries the full bundle
    let script = fs::read_to_string(root.join("elwood--1.1.0.sql")).unwrap();
    assert!(script.starts_with("-- src:001_schema\n"));
    assert!(script.ends_with("-- src:001_extra\nALTER TABLE a.node ADD COLUMN name text;\n--\n\n"));

    // Other control file lines survive the rewrite
    let control = fs::read_to_string(root.join("elwood.control")).unwrap();
    assert_eq!(
        control,
        "comment = 'elwood'\ndefault_version = '1.1.0'\nrelocatable = false\n"
    );
}

#[test]
fn unchanged_tree_is_nothing_to_release_and_writes_nothing() {
    let temp = new_project("0.0.0");
    let root = temp.path();
    release(root, |t| t).unwrap();
    let before = snapshot(root);

    let err = release(root, |t| t).unwrap_err();
    assert!(err.is_nothing_to_release());
    assert_eq!(snapshot(root), before);
}

#[test]
fn earlier_folder_taking_a_released_name_is_refused() {
    let temp = new_project("0.1.0");
    let root = temp.path();
    write(root, "migrations/v0.2.0/001_x.sql", "CREATE TABLE later(id int);\n");
    release(root, |t| t).unwrap();
    assert!(artifact(root, "latest.json").includes("001_x"));

    write(root, "migrations/v0.1.5/001_x.sql", "CREATE TABLE hotfix(id int);\n");
    let before = snapshot(root);

    let err = release(root, |t| t).unwrap_err();
    assert!(matches!(err, ReleaseError::AmbiguousName { .. }));
    assert!(err.to_string().contains("v0.2.0/001_x"));
    assert_eq!(snapshot(root), before);

    // A unique stem releases normally
    fs::rename(
        root.join("migrations/v0.1.5/001_x.sql"),
        root.join("migrations/v0.1.5/001_hotfix.sql"),
    )
    .unwrap();
    let plan = release(root, |t| t).unwrap();
    assert_eq!(plan.delta, vec!["001_hotfix"]);
    assert!(artifact(root, "latest.json").sql.contains("CREATE TABLE hotfix"));
}

#[test]
fn existing_version_without_overwrite_is_conflict_and_leaves_files() {
    let temp = new_project("0.1.0");
    let root = temp.path();
    let stale = ReleaseArtifact {
        version: SemVer::new(0, 2, 0),
        sql: "-- hand edited\n".to_string(),
        migrations: vec![MigrationName::new("001_schema")],
    };
    write(root, "versions/0.2.0.json", &stale.to_json().unwrap());
    let before = snapshot(root);

    let err = release(root, |t| t).unwrap_err();
    assert!(matches!(err, ReleaseError::Conflict { .. }));
    assert_eq!(snapshot(root), before);
}

#[test]
fn overwrite_replaces_the_current_version() {
    let temp = new_project("0.0.0");
    let root = temp.path();
    release(root, |t| t).unwrap(); // 0.1.0: 001_schema, 002_node

    write(root, "migrations/v0.1.0/003_index.sql", "CREATE INDEX ON a.node(id);");
    let plan = release(root, |t| t.overwrite(true)).unwrap();

    assert_eq!(plan.version, SemVer::new(0, 1, 0));
    assert_eq!(control_version(root), SemVer::new(0, 1, 0));
    let replaced = artifact(root, "0.1.0.json");
    assert_eq!(replaced.migrations, vec!["001_schema", "002_node", "003_index"]);
    assert!(replaced.sql.contains("-- src:001_schema\n"));
    assert!(replaced.sql.contains("-- src:003_index\nCREATE INDEX ON a.node(id);\n--\n\n"));
    assert_eq!(artifact(root, "latest.json"), replaced);
}

#[test]
fn overwrite_without_changes_republishes_same_contents() {
    let temp = new_project("0.0.0");
    let root = temp.path();
    release(root, |t| t).unwrap();
    let first = artifact(root, "0.1.0.json");

    release(root, |t| t.overwrite(true)).unwrap();
    assert_eq!(artifact(root, "0.1.0.json"), first);
}

#[test]
fn manifests_grow_monotonically() {
    let temp = new_project("0.0.0");
    let root = temp.path();
    release(root, |t| t).unwrap();

    write(root, "migrations/v0.2.0/001_member.sql", "CREATE TABLE a.member(id uuid);");
    release(root, |t| t).unwrap();

    write(root, "migrations/v0.3.0/001_run.sql", "CREATE TABLE a.run(id uuid);");
    release(root, |t| t).unwrap();

    let versions: Vec<ReleaseArtifact> = ["0.1.0.json", "0.2.0.json", "0.3.0.json"]
        .iter()
        .map(|f| artifact(root, f))
        .collect();
    for pair in versions.windows(2) {
        let (older, newer) = (&pair[0], &pair[1]);
        assert!(older.migrations.iter().all(|m| newer.migrations.contains(m)));
        assert!(newer.migrations.len() > older.migrations.len());
        assert!(older.version < newer.version);
    }
}

#[test]
fn capture_failure_writes_no_artifacts() {
    let temp = new_project("0.0.0");
    let root = temp.path();
    write(
        root,
        "migrations/v0.1.0/003_broken.yml",
        "up:\n  - sql: CREATE TABLE a.one(id int);\n  - sql: CREATE TABLE a.two(id int);\n  - create_view: { name: v, query: '' }\n",
    );
    let before = snapshot(root);

    let err = release(root, |t| t).unwrap_err();
    assert!(matches!(
        err,
        ReleaseError::Compile(sq_compile::CompileError::Capture { .. })
    ));
    assert!(!root.join("versions").exists());
    assert_eq!(snapshot(root), before);
}

#[test]
fn dry_run_plan_writes_nothing() {
    let temp = new_project("0.0.0");
    let root = temp.path();
    let before = snapshot(root);

    let project = Project::load(root).unwrap();
    let registry = MigrationRegistry::from_project(&project).unwrap();
    let bundle = Compiler::for_project(&project).compile(&registry).unwrap();
    let plan = ReleaseTracker::from_project(&project).plan(&bundle).unwrap();

    assert_eq!(plan.version, SemVer::new(0, 1, 0));
    assert_eq!(plan.writes.len(), 4);
    assert_eq!(snapshot(root), before);
}

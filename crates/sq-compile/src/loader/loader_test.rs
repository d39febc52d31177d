use super::*;
use sq_core::SemVer;
use sq_driver::CaptureDriver;
use sq_schema::SchemaHandle;
use std::path::Path;
use tempfile::TempDir;

fn folder(dir: &Path) -> VersionFolder {
    VersionFolder {
        label: "v0.1.0".to_string(),
        version: SemVer::new(0, 1, 0),
        path: dir.to_path_buf(),
        files: Vec::new(),
    }
}

fn write_file(dir: &Path, file_name: &str, contents: &str) -> MigrationFile {
    let path = dir.join(file_name);
    std::fs::write(&path, contents).unwrap();
    let (stem, extension) = file_name.rsplit_once('.').unwrap();
    MigrationFile {
        stem: stem.to_string(),
        file_name: file_name.to_string(),
        extension: extension.to_string(),
        path,
    }
}

fn loaders() -> LoaderRegistry {
    LoaderRegistry::with_builtins(&HashMap::new())
}

fn capture_up(migration: &dyn Migration) -> Vec<String> {
    let mut driver = CaptureDriver::new();
    let mut db = SchemaHandle::new(&mut driver, "app");
    migration.up(&mut db).unwrap();
    driver.harvest().to_vec()
}

fn capture_down(migration: &dyn Migration) -> Vec<String> {
    let mut driver = CaptureDriver::new();
    let mut db = SchemaHandle::new(&mut driver, "app");
    migration.down(&mut db).unwrap();
    driver.harvest().to_vec()
}

#[test]
fn test_builtin_extensions() {
    assert_eq!(loaders().extensions(), vec!["sql", "yaml", "yml"]);
}

#[test]
fn test_sql_whole_file_is_up() {
    let temp = TempDir::new().unwrap();
    let file = write_file(temp.path(), "001_schema.sql", "CREATE SCHEMA a;\n");
    let migration = loaders().load(&file, &folder(temp.path())).unwrap();

    assert!(!migration.has_down());
    assert_eq!(capture_up(migration.as_ref()), vec!["CREATE SCHEMA a;"]);
}

#[test]
fn test_sql_sections_and_globals() {
    let temp = TempDir::new().unwrap();
    let file = write_file(
        temp.path(),
        "002_node.sql",
        "-- migrate:up\nCREATE TABLE {{ schema }}.node(id uuid); -- {{ migration }} {{ version }}\n\n-- migrate:down\nDROP TABLE {{ schema }}.node;\n",
    );
    let migration = loaders().load(&file, &folder(temp.path())).unwrap();

    assert!(migration.has_down());
    assert_eq!(
        capture_up(migration.as_ref()),
        vec!["CREATE TABLE app.node(id uuid); -- 002_node v0.1.0"]
    );
    assert_eq!(capture_down(migration.as_ref()), vec!["DROP TABLE app.node;"]);
}

#[test]
fn test_sql_vars_from_config() {
    let temp = TempDir::new().unwrap();
    let file = write_file(
        temp.path(),
        "003_grant.sql",
        "GRANT USAGE ON SCHEMA {{ schema }} TO {{ var('role') }};",
    );
    let mut vars = HashMap::new();
    vars.insert(
        "role".to_string(),
        serde_yaml::Value::String("authenticated".to_string()),
    );
    let migration = LoaderRegistry::with_builtins(&vars)
        .load(&file, &folder(temp.path()))
        .unwrap();

    assert_eq!(
        capture_up(migration.as_ref()),
        vec!["GRANT USAGE ON SCHEMA app TO authenticated;"]
    );
}

#[test]
fn test_sql_down_only_is_missing_up() {
    let temp = TempDir::new().unwrap();
    let file = write_file(temp.path(), "004_x.sql", "-- migrate:down\nDROP SCHEMA a;\n");
    let err = loaders().load(&file, &folder(temp.path())).err().unwrap();
    assert!(matches!(err, CompileError::MissingUp { .. }));
    assert!(err.is_discovery());
}

#[test]
fn test_sql_empty_file_is_missing_up() {
    let temp = TempDir::new().unwrap();
    let file = write_file(temp.path(), "005_empty.sql", "  \n\n");
    let err = loaders().load(&file, &folder(temp.path())).err().unwrap();
    assert!(matches!(err, CompileError::MissingUp { .. }));
}

#[test]
fn test_sql_template_syntax_checked_at_load() {
    let temp = TempDir::new().unwrap();
    let file = write_file(temp.path(), "006_bad.sql", "SELECT {{ 1 + }};");
    let err = loaders().load(&file, &folder(temp.path())).err().unwrap();
    assert!(matches!(err, CompileError::Template { .. }));
    assert!(err.to_string().contains("[D008]"));
}

#[test]
fn test_sql_raw_block_keeps_braces_literal() {
    let temp = TempDir::new().unwrap();
    let file = write_file(
        temp.path(),
        "007_grid.sql",
        "INSERT INTO {{ schema }}.grid VALUES ('{% raw %}{{1,2},{3,4}}{% endraw %}');\n",
    );
    let migration = loaders().load(&file, &folder(temp.path())).unwrap();

    assert_eq!(
        capture_up(migration.as_ref()),
        vec!["INSERT INTO app.grid VALUES ('{{1,2},{3,4}}');"]
    );
}

#[test]
fn test_sql_unescaped_array_literal_is_template_error() {
    let temp = TempDir::new().unwrap();
    let file = write_file(
        temp.path(),
        "008_grid.sql",
        "INSERT INTO a.grid VALUES ('{{1,2},{3,4}}');",
    );
    let err = loaders().load(&file, &folder(temp.path())).err().unwrap();
    assert!(matches!(err, CompileError::Template { .. }));
    assert!(err.to_string().contains("008_grid.sql"));
}

#[test]
fn test_sql_warn_renders_nothing() {
    let temp = TempDir::new().unwrap();
    let file = write_file(
        temp.path(),
        "009_legacy.sql",
        "{{ warn('replaced by 010_node') }}CREATE TABLE {{ schema }}.legacy(id int);",
    );
    let migration = loaders().load(&file, &folder(temp.path())).unwrap();

    assert_eq!(
        capture_up(migration.as_ref()),
        vec!["CREATE TABLE app.legacy(id int);"]
    );
}

#[test]
fn test_split_sections_rules() {
    let sections = sql::split_sections("SELECT 1;").unwrap();
    assert_eq!(sections.up.as_deref(), Some("SELECT 1;"));
    assert_eq!(sections.down, None);

    let sections = sql::split_sections("\n-- MIGRATE:UP\nSELECT 1;\n-- migrate:down\n\n").unwrap();
    assert_eq!(sections.up.as_deref(), Some("SELECT 1;"));
    assert_eq!(sections.down, None);

    assert!(sql::split_sections("SELECT 0;\n-- migrate:up\nSELECT 1;").is_err());
    assert!(sql::split_sections("-- migrate:up\nA\n-- migrate:up\nB").is_err());
}

#[test]
fn test_yaml_ops() {
    let temp = TempDir::new().unwrap();
    let file = write_file(
        temp.path(),
        "010_node.yml",
        r#"
up:
  - create_table:
      name: node
      columns:
        - { name: id, type: uuid, primary_key: true }
  - sql: "COMMENT ON TABLE {{ schema }}.node IS 'from {{ migration }}';"
down:
  - drop_table: { name: node }
"#,
    );
    let migration = loaders().load(&file, &folder(temp.path())).unwrap();

    assert!(migration.has_down());
    let up = capture_up(migration.as_ref());
    assert_eq!(up.len(), 2);
    assert!(up[0].starts_with("CREATE TABLE \"app\".\"node\" ("));
    assert_eq!(up[1], "COMMENT ON TABLE app.node IS 'from 010_node';");
    assert_eq!(
        capture_down(migration.as_ref()),
        vec!["DROP TABLE IF EXISTS \"app\".\"node\";"]
    );
}

#[test]
fn test_yaml_without_up_is_missing_up() {
    let temp = TempDir::new().unwrap();
    let file = write_file(temp.path(), "011_x.yaml", "down:\n  - drop_table: { name: node }\n");
    let err = loaders().load(&file, &folder(temp.path())).err().unwrap();
    assert!(matches!(err, CompileError::MissingUp { .. }));
}

#[test]
fn test_yaml_unknown_key_is_invalid_module() {
    let temp = TempDir::new().unwrap();
    let file = write_file(temp.path(), "012_x.yml", "upp:\n  - sql: SELECT 1\n");
    let err = loaders().load(&file, &folder(temp.path())).err().unwrap();
    assert!(matches!(err, CompileError::InvalidModule { .. }));
}

#[test]
fn test_unsupported_extension() {
    let temp = TempDir::new().unwrap();
    let file = write_file(temp.path(), "001_x.ts", "export {}");
    let err = loaders().load(&file, &folder(temp.path())).err().unwrap();
    assert!(matches!(err, CompileError::UnsupportedExtension { .. }));
}

use super::*;
use tempfile::TempDir;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("name: elwood").unwrap();
    assert_eq!(config.name, "elwood");
    assert_eq!(config.schema, "public");
    assert_eq!(config.extensions, vec!["sql", "yml", "yaml"]);
    assert_eq!(config.ignore_prefix.as_deref(), Some("_"));
    assert_eq!(config.release_type, ReleaseType::Minor);
    assert!(config.sql_script);

    let root = PathBuf::from("/tmp/pkg");
    assert_eq!(config.migration_path_absolute(&root), root.join("migrations"));
    assert_eq!(config.versions_path_absolute(&root), root.join("versions"));
    assert_eq!(config.control_path_absolute(&root), root.join("elwood.control"));
    assert_eq!(
        config.sql_script_path(&root, "1.1.0"),
        root.join("elwood--1.1.0.sql")
    );
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: elwood
migration_path: db/migrations
schema: elwood
extensions: [sql]
ignore_prefix: "~"
ignore_patterns: ["*.draft.sql"]
control_file: ext/elwood.control
versions_path: dist
sql_script: false
release_type: patch
version_placeholder: "$$VERSION$$"
vars:
  owner: postgres
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    config.validate().unwrap();
    assert_eq!(config.schema, "elwood");
    assert_eq!(config.release_type, ReleaseType::Patch);
    assert_eq!(config.vars.len(), 1);

    let root = PathBuf::from("/tmp/pkg");
    assert_eq!(
        config.control_path_absolute(&root),
        root.join("ext/elwood.control")
    );
    assert_eq!(
        config.sql_script_path(&root, "0.2.0"),
        root.join("ext/elwood--0.2.0.sql")
    );
}

#[test]
fn test_ignore_prefix_can_be_disabled() {
    let config: Config = serde_yaml::from_str("name: x\nignore_prefix: null").unwrap();
    assert!(config.ignore_prefix.is_none());
}

#[test]
fn test_unknown_field_rejected() {
    assert!(serde_yaml::from_str::<Config>("name: x\nbogus: 1").is_err());
}

#[test]
fn test_validate_rejects_bad_values() {
    for yaml in [
        "name: ''",
        "name: x\nextensions: []",
        "name: x\nextensions: ['.sql']",
        "name: x\nignore_patterns: ['[unclosed']",
        "name: x\nversion_placeholder: '  '",
    ] {
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(
            matches!(config.validate(), Err(CoreError::ConfigInvalid { .. })),
            "accepted {yaml:?}"
        );
    }
}

#[test]
fn test_load_missing_config() {
    let temp = TempDir::new().unwrap();
    let err = Config::load_from_dir(temp.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_from_dir() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(CONFIG_FILE_NAME), "name: elwood\n").unwrap();
    let config = Config::load_from_dir(temp.path()).unwrap();
    assert_eq!(config.name, "elwood");
}

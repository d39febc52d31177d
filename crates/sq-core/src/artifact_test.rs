use super::*;
use tempfile::TempDir;

fn artifact(version: &str, names: &[&str]) -> ReleaseArtifact {
    ReleaseArtifact {
        version: SemVer::parse(version).unwrap(),
        sql: "-- src:001_schema\nCREATE SCHEMA a;\n--\n\n".to_string(),
        migrations: names.iter().map(|n| MigrationName::new(*n)).collect(),
    }
}

#[test]
fn test_json_shape() {
    let json = artifact("1.0.0", &["001_schema"]).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["version"], "1.0.0");
    assert_eq!(value["migrations"][0], "001_schema");
    assert!(value["sql"].as_str().unwrap().starts_with("-- src:001_schema"));
    assert!(json.ends_with('\n'));
}

#[test]
fn test_load_missing_is_none() {
    let temp = TempDir::new().unwrap();
    assert!(ReleaseArtifact::load(&temp.path().join("1.0.0.json"))
        .unwrap()
        .is_none());
}

#[test]
fn test_load_roundtrip_and_corrupt() {
    let temp = TempDir::new().unwrap();
    let original = artifact("1.0.0", &["001_schema", "002_node"]);
    let path = ReleaseArtifact::path_for(temp.path(), &original.version);
    std::fs::write(&path, original.to_json().unwrap()).unwrap();
    let loaded = ReleaseArtifact::load(&path).unwrap().unwrap();
    assert_eq!(loaded, original);
    assert!(loaded.includes("002_node"));

    std::fs::write(&path, "{not json").unwrap();
    assert!(matches!(
        ReleaseArtifact::load(&path),
        Err(CoreError::ArtifactParse { .. })
    ));
}

#[test]
fn test_list_versions_sorted_and_filtered() {
    let temp = TempDir::new().unwrap();
    for v in ["1.10.0", "1.2.0", "1.9.0"] {
        let a = artifact(v, &["001_schema"]);
        std::fs::write(
            ReleaseArtifact::path_for(temp.path(), &a.version),
            a.to_json().unwrap(),
        )
        .unwrap();
    }
    std::fs::write(ReleaseArtifact::latest_path(temp.path()), "{}").unwrap();
    std::fs::write(temp.path().join("notes.txt"), "x").unwrap();

    let versions: Vec<String> = ReleaseArtifact::list_versions(temp.path())
        .unwrap()
        .into_iter()
        .map(|(v, _)| v.to_string())
        .collect();
    assert_eq!(versions, vec!["1.2.0", "1.9.0", "1.10.0"]);
}

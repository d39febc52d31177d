use super::*;

fn module(name: &str, folder: &str, statements: &[&str]) -> SquashedBundle {
    SquashedBundle {
        name: MigrationName::new(name),
        folder: folder.to_string(),
        statements: statements.iter().map(|s| s.to_string()).collect(),
    }
}

fn sample() -> CompiledBundle {
    CompiledBundle {
        versions: vec![
            VersionBundle {
                label: "v0.1.0".to_string(),
                modules: vec![
                    module("001_schema", "v0.1.0", &["CREATE SCHEMA a;"]),
                    module("002_node", "v0.1.0", &["CREATE TABLE a.node(id uuid);"]),
                ],
            },
            VersionBundle {
                label: "v0.1.1".to_string(),
                modules: vec![module(
                    "001_extra",
                    "v0.1.1",
                    &["ALTER TABLE a.node ADD COLUMN name text;"],
                )],
            },
        ],
    }
}

#[test]
fn test_module_render_format() {
    let m = module("010_x", "v0.1.0", &["SELECT 1;", "SELECT 2;"]);
    assert_eq!(m.render(), "-- src:010_x\nSELECT 1;\nSELECT 2;\n--\n\n");
}

#[test]
fn test_full_bundle_concatenates_in_order() {
    let bundle = sample();
    assert_eq!(
        bundle.sql(),
        "-- src:001_schema\nCREATE SCHEMA a;\n--\n\n\
         -- src:002_node\nCREATE TABLE a.node(id uuid);\n--\n\n\
         -- src:001_extra\nALTER TABLE a.node ADD COLUMN name text;\n--\n\n"
    );
    assert_eq!(
        bundle.versions[0].render(),
        "-- src:001_schema\nCREATE SCHEMA a;\n--\n\n-- src:002_node\nCREATE TABLE a.node(id uuid);\n--\n\n"
    );
}

#[test]
fn test_names_and_counts() {
    let bundle = sample();
    assert_eq!(
        bundle.migration_names(),
        vec!["001_schema", "002_node", "001_extra"]
    );
    assert_eq!(bundle.module_count(), 3);
    assert_eq!(bundle.statement_count(), 3);
    assert!(!bundle.is_empty());
    assert!(CompiledBundle::default().is_empty());
}

#[test]
fn test_render_only_keeps_compile_order() {
    let bundle = sample();
    let only = bundle.render_only(&[MigrationName::new("001_extra"), MigrationName::new("001_schema")]);
    assert_eq!(
        only,
        "-- src:001_schema\nCREATE SCHEMA a;\n--\n\n-- src:001_extra\nALTER TABLE a.node ADD COLUMN name text;\n--\n\n"
    );
    assert_eq!(bundle.render_only(&[]), "");
}

#[test]
fn test_checksum_tracks_content() {
    let a = sample();
    let mut b = sample();
    assert_eq!(a.checksum(), b.checksum());

    b.versions[1].modules[0].statements[0].push(' ');
    assert_ne!(a.checksum(), b.checksum());
}

//! Init command implementation - scaffolds a new Squashpack package

use anyhow::{Context, Result};
use sq_core::config::CONFIG_FILE_NAME;
use sq_core::ControlRecord;
use std::fs;
use std::path::Path;

use crate::cli::{GlobalArgs, InitArgs};

/// Execute the init command
pub(crate) async fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let project_dir = Path::new(&global.project_dir);
    let name = match &args.name {
        Some(name) => name.clone(),
        None => default_name(project_dir)?,
    };
    validate_name(&name)?;

    let config_path = project_dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!(
            "'{}' already exists. Refusing to overwrite an existing package.",
            config_path.display()
        );
    }
    let control_path = project_dir.join(format!("{name}.control"));
    if control_path.exists() {
        anyhow::bail!("'{}' already exists.", control_path.display());
    }

    println!("Creating new Squashpack package: {}\n", name);

    for dir in ["migrations/v0.1.0", "versions"] {
        let path = project_dir.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }

    let config_content = format!(
        r#"name: "{name}"
schema: "{name}"

migration_path: migrations
versions_path: versions

# Bump applied by `sq release` when --bump is not given
release_type: minor

# Also write <name>--<version>.sql next to the control file
sql_script: true

vars: {{}}
"#,
        name = name.replace('"', "\\\""),
    );
    fs::write(&config_path, config_content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    fs::write(&control_path, ControlRecord::scaffold(&name, &name))
        .context("Failed to write control file")?;

    let example = "-- migrate:up\n\
                   {# Migrations are templates: wrap literal {{ or {% in {% raw %}...{% endraw %} #}\n\
                   CREATE SCHEMA IF NOT EXISTS {{ schema | ident }};\n\n\
                   -- migrate:down\nDROP SCHEMA IF EXISTS {{ schema | ident }} CASCADE;\n";
    fs::write(project_dir.join("migrations/v0.1.0/001_schema.sql"), example)
        .context("Failed to write example migration")?;

    println!("  Created {}", CONFIG_FILE_NAME);
    println!("  Created {}.control", name);
    println!("  Created migrations/v0.1.0/001_schema.sql");
    println!("  Created versions/");
    println!();
    println!("Next steps:");
    println!("  sq ls        # List migrations");
    println!("  sq release   # Publish version 0.1.0");

    Ok(())
}

fn default_name(project_dir: &Path) -> Result<String> {
    let absolute = if project_dir.is_absolute() {
        project_dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(project_dir)
    };
    absolute
        .components()
        .next_back()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|n| n != "." && n != "/")
        .context("Cannot derive a package name from the project directory; pass --name")
}

/// Reject names that would escape the project directory or confuse SQL tooling
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
        || name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid package name '{}': must not be empty, contain '/', '\\', '..', or start with '.' or '-'",
            name
        );
    }
    Ok(())
}

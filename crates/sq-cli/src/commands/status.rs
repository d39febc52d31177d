//! Status command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sq_core::ReleaseArtifact;

use super::common::{load_project, load_registry};
use crate::cli::{GlobalArgs, LsOutput, StatusArgs};

/// Release state of the package
#[derive(Debug, Serialize)]
struct Status {
    name: String,
    default_version: String,
    latest_release: Option<String>,
    released: usize,
    pending: Vec<String>,
    missing: Vec<String>,
}

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let control = project.control().context("Failed to read control file")?;
    let registry = load_registry(&project)?;
    let latest = ReleaseArtifact::load(&ReleaseArtifact::latest_path(&project.versions_dir()))
        .context("Failed to read latest release")?;

    let pending = registry
        .modules()
        .iter()
        .filter(|m| !latest.as_ref().is_some_and(|a| a.includes(m.name())))
        .map(|m| m.name().to_string())
        .collect();
    let missing = latest
        .as_ref()
        .map(|a| {
            a.migrations
                .iter()
                .filter(|name| registry.get(name).is_none())
                .map(|name| name.to_string())
                .collect()
        })
        .unwrap_or_default();

    let status = Status {
        name: project.config.name.clone(),
        default_version: control.default_version().to_string(),
        latest_release: latest.as_ref().map(|a| a.version.to_string()),
        released: latest.as_ref().map(|a| a.migrations.len()).unwrap_or(0),
        pending,
        missing,
    };

    match args.output {
        LsOutput::Table => print_status(&status),
        LsOutput::Json => {
            let json =
                serde_json::to_string_pretty(&status).context("Failed to serialize status")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn print_status(status: &Status) {
    println!("Package:          {}", status.name);
    println!("Default version:  {}", status.default_version);
    match &status.latest_release {
        Some(version) => println!(
            "Latest release:   {} ({} migrations)",
            version, status.released
        ),
        None => println!("Latest release:   none"),
    }
    println!("Pending:          {}", status.pending.len());
    for name in &status.pending {
        println!("  + {}", name);
    }
    if !status.missing.is_empty() {
        println!("Missing from tree: {}", status.missing.len());
        for name in &status.missing {
            println!("  ? {}", name);
        }
    }
}

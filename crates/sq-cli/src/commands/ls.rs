//! List command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sq_compile::MigrationRegistry;
use sq_core::Project;

use super::common::{display_path, load_project, load_registry};
use crate::cli::{GlobalArgs, LsArgs, LsOutput};

/// Execute the ls command
pub(crate) async fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let registry = load_registry(&project)?;
    let modules = module_info(&project, &registry);

    match args.output {
        LsOutput::Table => print_table(&modules),
        LsOutput::Json => {
            let json = serde_json::to_string_pretty(&modules)
                .context("Failed to serialize migration list")?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// One migration as shown by `sq ls`
#[derive(Debug, Serialize)]
struct ModuleInfo {
    folder: String,
    name: String,
    file: Option<String>,
    has_down: bool,
}

fn module_info(project: &Project, registry: &MigrationRegistry) -> Vec<ModuleInfo> {
    registry
        .modules()
        .iter()
        .map(|module| ModuleInfo {
            folder: module.folder().to_string(),
            name: module.name().to_string(),
            file: module.source().map(|p| display_path(project, p)),
            has_down: module.migration().has_down(),
        })
        .collect()
}

fn print_table(modules: &[ModuleInfo]) {
    let folder_width = modules
        .iter()
        .map(|m| m.folder.len())
        .max()
        .unwrap_or(6)
        .max(6);
    let name_width = modules
        .iter()
        .map(|m| m.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    println!(
        "{:<folder_width$}  {:<name_width$}  {:<4}  FILE",
        "FOLDER", "NAME", "DOWN"
    );
    println!(
        "{:-<folder_width$}  {:-<name_width$}  {:-<4}  {}",
        "",
        "",
        "",
        "-".repeat(40)
    );

    for module in modules {
        println!(
            "{:<folder_width$}  {:<name_width$}  {:<4}  {}",
            module.folder,
            module.name,
            if module.has_down { "yes" } else { "no" },
            module.file.as_deref().unwrap_or("-")
        );
    }

    let folders = modules
        .iter()
        .map(|m| m.folder.as_str())
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    println!();
    println!("{} migrations in {} version folders", modules.len(), folders);
}

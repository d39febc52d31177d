//! Compile command implementation

use anyhow::{Context, Result};
use sq_compile::Compiler;
use std::path::Path;

use super::common::{load_project, load_registry, write_atomic};
use crate::cli::{CompileArgs, GlobalArgs};

/// Execute the compile command
pub(crate) async fn execute(args: &CompileArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let registry = load_registry(&project)?;

    let mut compiler = Compiler::for_project(&project);
    let bundle = if args.down {
        compiler.compile_down(&registry)
    } else {
        compiler.compile(&registry)
    }
    .context("Failed to compile migrations")?;

    if global.verbose {
        eprintln!(
            "[verbose] Compiled {} migrations ({} statements) into schema '{}', checksum {}",
            bundle.module_count(),
            bundle.statement_count(),
            compiler.schema(),
            bundle.checksum()
        );
    }

    match &args.output {
        Some(output) => {
            let path = Path::new(output);
            write_atomic(path, &bundle.sql())?;
            println!(
                "Wrote {} migrations to {}",
                bundle.module_count(),
                path.display()
            );
        }
        None => print!("{}", bundle.sql()),
    }
    Ok(())
}

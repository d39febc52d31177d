//! Release command implementation

use anyhow::{Context, Result};
use sq_compile::Compiler;
use sq_core::Project;
use sq_release::{ReleaseError, ReleasePlan, ReleaseTracker};

use super::common::{display_path, load_project, load_registry, ExitCode};
use crate::cli::{GlobalArgs, ReleaseArgs};

/// Execute the release command
pub(crate) async fn execute(args: &ReleaseArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let registry = load_registry(&project)?;
    let bundle = Compiler::for_project(&project)
        .compile(&registry)
        .context("Failed to compile migrations")?;

    let mut tracker = ReleaseTracker::from_project(&project).overwrite(args.overwrite);
    if let Some(level) = args.bump {
        tracker = tracker.bump(level.into());
    }

    let outcome = if args.dry_run {
        tracker.plan(&bundle)
    } else {
        tracker.release(&bundle)
    };

    let plan = match outcome {
        Ok(plan) => plan,
        Err(err @ ReleaseError::NothingToRelease { .. }) => {
            eprintln!("{err}");
            return Err(ExitCode(1).into());
        }
        Err(err) => return Err(err).context("Release failed"),
    };

    print_plan(&project, &plan, args.dry_run);
    Ok(())
}

fn print_plan(project: &Project, plan: &ReleasePlan, dry_run: bool) {
    let verb = match (dry_run, plan.overwrite) {
        (true, true) => "Would overwrite",
        (true, false) => "Would release",
        (false, true) => "Overwrote",
        (false, false) => "Released",
    };
    if plan.overwrite {
        println!("{} {}", verb, plan.version);
    } else {
        println!("{} {} (previous {})", verb, plan.version, plan.previous);
    }

    match &plan.baseline {
        Some(baseline) => println!("  baseline: {}", baseline),
        None => println!("  baseline: none (first release)"),
    }

    println!("  new migrations ({}):", plan.delta.len());
    for name in &plan.delta {
        println!("    + {}", name);
    }
    if !plan.missing.is_empty() {
        println!("  released but no longer in the tree ({}):", plan.missing.len());
        for name in &plan.missing {
            println!("    ? {}", name);
        }
    }

    let label = if dry_run { "would write" } else { "wrote" };
    for write in &plan.writes {
        println!("  {} {}", label, display_path(project, &write.path));
    }
}

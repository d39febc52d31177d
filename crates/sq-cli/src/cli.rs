//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use sq_core::ReleaseType;

/// Squashpack - package versioned database migrations into SQL releases
#[derive(Parser, Debug)]
#[command(name = "sq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new package in the project directory
    Init(InitArgs),

    /// List discovered migrations in compile order
    Ls(LsArgs),

    /// Squash every migration into one SQL bundle
    Compile(CompileArgs),

    /// Publish the migrations added since the last release
    Release(ReleaseArgs),

    /// Show released and pending migrations
    Status(StatusArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Package name (default: the project directory's name)
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: LsOutput,
}

/// List output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

/// Arguments for the compile command
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Write the bundle to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Compile the down procedures, newest migration first
    #[arg(long)]
    pub down: bool,
}

/// Arguments for the release command
#[derive(Args, Debug)]
pub struct ReleaseArgs {
    /// Replace the current version's artifact instead of bumping
    #[arg(long)]
    pub overwrite: bool,

    /// Version component to bump (default: `release_type` from config)
    #[arg(short, long, value_enum, conflicts_with = "overwrite")]
    pub bump: Option<BumpLevel>,

    /// Show what would be released without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Semantic version component
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpLevel {
    Major,
    Minor,
    Patch,
}

impl From<BumpLevel> for ReleaseType {
    fn from(level: BumpLevel) -> Self {
        match level {
            BumpLevel::Major => ReleaseType::Major,
            BumpLevel::Minor => ReleaseType::Minor,
            BumpLevel::Patch => ReleaseType::Patch,
        }
    }
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: LsOutput,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

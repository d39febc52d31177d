//! sq-core - Core library for Squashpack
//!
//! This crate provides shared types, configuration parsing, semantic versions,
//! migration-tree discovery, the control record, and the release artifact
//! model used across all Squashpack components.

pub mod artifact;
pub mod checksum;
pub mod config;
pub mod control;
pub mod error;
pub mod migration_name;
pub mod project;
pub mod semver;
pub mod sql_utils;

pub use artifact::ReleaseArtifact;
pub use checksum::compute_checksum;
pub use config::Config;
pub use control::ControlRecord;
pub use error::{CoreError, CoreResult};
pub use migration_name::MigrationName;
pub use project::{DiscoveryOptions, MigrationFile, MigrationTree, Project, VersionFolder};
pub use semver::{ReleaseType, SemVer};

//! sq-release - Release tracking for Squashpack
//!
//! The [`ReleaseTracker`] compares a compiled bundle against the last
//! published artifact, picks the next version, and publishes the new
//! artifact, the `latest.json` pointer, the optional SQL script and the
//! updated control file as one all-or-nothing batch.

pub mod error;
mod publish;
pub mod tracker;

pub use error::{ReleaseError, ReleaseResult};
pub use publish::PendingWrite;
pub use tracker::{ReleasePlan, ReleaseTracker};

//! Release planning and publishing

use crate::error::{ReleaseError, ReleaseResult};
use crate::publish::{publish_atomic, PendingWrite};
use sq_compile::CompiledBundle;
use sq_core::{Config, ControlRecord, MigrationName, Project, ReleaseArtifact, ReleaseType, SemVer};
use std::collections::HashSet;
use std::path::PathBuf;

/// Everything a release would write, computed without touching the disk.
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    /// Control file's default version before the release
    pub previous: SemVer,
    /// Version being released
    pub version: SemVer,
    /// Whether an existing artifact for `version` is replaced
    pub overwrite: bool,
    /// Version of the artifact the delta was computed against
    pub baseline: Option<SemVer>,
    /// Modules new in this release, in compile order
    pub delta: Vec<MigrationName>,
    /// Previously released modules absent from the current tree
    pub missing: Vec<MigrationName>,
    /// The artifact written to `<versions>/<version>.json` and `latest.json`
    pub artifact: ReleaseArtifact,
    /// Files to write, control file last
    pub writes: Vec<PendingWrite>,
}

/// Turns a compiled bundle into a published release.
#[derive(Debug, Clone)]
pub struct ReleaseTracker {
    versions_dir: PathBuf,
    control_path: PathBuf,
    script: Option<ScriptTarget>,
    release_type: ReleaseType,
    version_placeholder: Option<String>,
    overwrite: bool,
}

/// Where `<name>--<version>.sql` install scripts go
#[derive(Debug, Clone)]
struct ScriptTarget {
    root: PathBuf,
    config: Config,
}

impl ReleaseTracker {
    /// A tracker configured from the project's `squashpack.yml`
    pub fn from_project(project: &Project) -> Self {
        let config = &project.config;
        let control_path = project.control_path();
        let script = config.sql_script.then(|| ScriptTarget {
            root: project.root.clone(),
            config: config.clone(),
        });
        Self {
            versions_dir: project.versions_dir(),
            control_path,
            script,
            release_type: config.release_type,
            version_placeholder: config.version_placeholder.clone(),
            overwrite: false,
        }
    }

    /// Component to bump; defaults to the configured `release_type`
    pub fn bump(mut self, release_type: ReleaseType) -> Self {
        self.release_type = release_type;
        self
    }

    /// Re-release the control file's current version instead of bumping
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Compute the release without writing anything.
    ///
    /// Fails with [`ReleaseError::AmbiguousName`] when a new folder-qualified
    /// module shares its stem with a released bare name, with
    /// [`ReleaseError::NothingToRelease`] when no module is new (unless
    /// overwriting) and with [`ReleaseError::Conflict`] when the target
    /// version already has an artifact (unless overwriting).
    pub fn plan(&self, bundle: &CompiledBundle) -> ReleaseResult<ReleasePlan> {
        let control = ControlRecord::load(&self.control_path)?;
        let previous = control.default_version().clone();
        let version = if self.overwrite {
            previous.clone()
        } else {
            previous.bump(self.release_type)
        };

        let baseline = self.baseline(&version)?;
        let released: Vec<MigrationName> = baseline
            .as_ref()
            .map(|a| a.migrations.clone())
            .unwrap_or_default();
        let released_set: HashSet<&MigrationName> = released.iter().collect();

        let compiled = bundle.migration_names();
        let delta: Vec<MigrationName> = compiled
            .iter()
            .filter(|name| !released_set.contains(name))
            .cloned()
            .collect();

        // Bare names belong to the first folder holding a stem, so a folder
        // sorting earlier can take over a released bare name.
        if let Some(name) = delta.iter().find(|name| {
            name.is_qualified() && released.iter().any(|r| r.as_str() == bare_stem(name))
        }) {
            return Err(ReleaseError::AmbiguousName {
                name: name.to_string(),
                stem: bare_stem(name).to_string(),
            });
        }

        if delta.is_empty() && !self.overwrite {
            return Err(ReleaseError::NothingToRelease { version: previous });
        }

        let artifact_path = ReleaseArtifact::path_for(&self.versions_dir, &version);
        if !self.overwrite && artifact_path.exists() {
            return Err(ReleaseError::Conflict {
                version,
                path: artifact_path.display().to_string(),
            });
        }

        let compiled_set: HashSet<&MigrationName> = compiled.iter().collect();
        let missing: Vec<MigrationName> = released
            .iter()
            .filter(|name| !compiled_set.contains(name))
            .cloned()
            .collect();
        for name in &missing {
            log::warn!(
                "'{}' was released before but is no longer in the migration tree; keeping it in the manifest",
                name
            );
        }

        let mut migrations = released;
        migrations.extend(delta.iter().cloned());

        let artifact = ReleaseArtifact {
            version: version.clone(),
            sql: self.stamp(bundle.render_only(&delta), &version),
            migrations,
        };

        let mut writes = Vec::new();
        let json = artifact.to_json()?;
        writes.push(PendingWrite::new(artifact_path, json.clone()));
        writes.push(PendingWrite::new(
            ReleaseArtifact::latest_path(&self.versions_dir),
            json,
        ));
        if let Some(script) = &self.script {
            writes.push(PendingWrite::new(
                script
                    .config
                    .sql_script_path(&script.root, &version.to_string()),
                self.stamp(bundle.sql(), &version),
            ));
        }
        writes.push(PendingWrite::new(
            self.control_path.clone(),
            control.render_with_version(&version),
        ));

        log::debug!(
            "planned release {} (previous {}, baseline {}, {} new modules)",
            version,
            previous,
            baseline
                .as_ref()
                .map(|a| a.version.to_string())
                .unwrap_or_else(|| "none".to_string()),
            delta.len()
        );

        Ok(ReleasePlan {
            previous,
            version,
            overwrite: self.overwrite,
            baseline: baseline.map(|a| a.version),
            delta,
            missing,
            artifact,
            writes,
        })
    }

    /// Write a plan's files as one all-or-nothing batch
    pub fn publish(&self, plan: &ReleasePlan) -> ReleaseResult<()> {
        publish_atomic(&plan.writes)?;
        log::info!("released {}", plan.version);
        Ok(())
    }

    /// [`plan`](Self::plan) then [`publish`](Self::publish)
    pub fn release(&self, bundle: &CompiledBundle) -> ReleaseResult<ReleasePlan> {
        let plan = self.plan(bundle)?;
        self.publish(&plan)?;
        Ok(plan)
    }

    /// The artifact the delta is measured against.
    ///
    /// When overwriting `target`, that is the newest artifact older than
    /// `target`, so the rewritten artifact again holds exactly that
    /// version's additions. Otherwise it is `latest.json`, falling back to
    /// the newest version-labeled artifact.
    fn baseline(&self, target: &SemVer) -> ReleaseResult<Option<ReleaseArtifact>> {
        if !self.overwrite {
            let latest = ReleaseArtifact::load(&ReleaseArtifact::latest_path(&self.versions_dir))?;
            if latest.is_some() {
                return Ok(latest);
            }
        }

        let versions = ReleaseArtifact::list_versions(&self.versions_dir)?;
        let newest = versions
            .into_iter()
            .rev()
            .find(|(version, _)| !self.overwrite || version < target);
        match newest {
            Some((_, path)) => Ok(ReleaseArtifact::load(&path)?),
            None => Ok(None),
        }
    }

    fn stamp(&self, sql: String, version: &SemVer) -> String {
        match &self.version_placeholder {
            Some(token) => sql.replace(token.as_str(), &version.to_string()),
            None => sql,
        }
    }
}

/// `001_x` for `v0.2.0/001_x`
fn bare_stem(name: &MigrationName) -> &str {
    name.as_str()
        .rsplit_once('/')
        .map_or(name.as_str(), |(_, stem)| stem)
}

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tests;

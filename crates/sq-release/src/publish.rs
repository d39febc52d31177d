//! All-or-nothing publishing of a set of files

use crate::error::{ReleaseError, ReleaseResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One file a release will write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub path: PathBuf,
    pub contents: String,
}

impl PendingWrite {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{suffix}"))
}

fn publish_error(path: &Path, source: std::io::Error) -> ReleaseError {
    ReleaseError::Publish {
        path: path.display().to_string(),
        source,
    }
}

fn write_synced(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

/// Write every file or none of them.
///
/// Each file is first staged to a hidden temp sibling. Existing targets are
/// copied to a backup sibling, then the temps are renamed into place in the
/// given order. If any step fails, targets already replaced are restored
/// from their backups (or removed if they did not exist) and all temps are
/// deleted, leaving the tree as it was.
pub(crate) fn publish_atomic(writes: &[PendingWrite]) -> ReleaseResult<()> {
    publish_with(writes, |from, to| fs::rename(from, to))
}

/// [`publish_atomic`] with the final rename step supplied by the caller
fn publish_with<R>(writes: &[PendingWrite], rename: R) -> ReleaseResult<()>
where
    R: FnMut(&Path, &Path) -> std::io::Result<()>,
{
    let mut staged: Vec<PathBuf> = Vec::with_capacity(writes.len());
    let mut backups: Vec<Option<PathBuf>> = Vec::with_capacity(writes.len());

    let result = stage_and_commit(writes, &mut staged, &mut backups, rename);

    match result {
        Ok(()) => {
            for backup in backups.iter().flatten() {
                if let Err(e) = fs::remove_file(backup) {
                    log::warn!("could not remove backup {}: {}", backup.display(), e);
                }
            }
            Ok(())
        }
        Err((committed, err)) => {
            rollback(writes, &staged, &backups, committed);
            Err(err)
        }
    }
}

/// Returns the number of targets already replaced alongside any error.
fn stage_and_commit<R>(
    writes: &[PendingWrite],
    staged: &mut Vec<PathBuf>,
    backups: &mut Vec<Option<PathBuf>>,
    mut rename: R,
) -> Result<(), (usize, ReleaseError)>
where
    R: FnMut(&Path, &Path) -> std::io::Result<()>,
{
    for write in writes {
        if let Some(parent) = write.path.parent() {
            fs::create_dir_all(parent).map_err(|e| (0, publish_error(&write.path, e)))?;
        }
        let temp = sibling(&write.path, "sq-tmp");
        staged.push(temp.clone());
        write_synced(&temp, &write.contents).map_err(|e| (0, publish_error(&write.path, e)))?;
    }

    for write in writes {
        if write.path.exists() {
            let backup = sibling(&write.path, "sq-bak");
            backups.push(Some(backup.clone()));
            fs::copy(&write.path, &backup).map_err(|e| (0, publish_error(&write.path, e)))?;
        } else {
            backups.push(None);
        }
    }

    for (index, (write, temp)) in writes.iter().zip(staged.iter()).enumerate() {
        rename(temp, &write.path).map_err(|e| (index, publish_error(&write.path, e)))?;
        log::debug!("published {}", write.path.display());
    }
    Ok(())
}

fn rollback(
    writes: &[PendingWrite],
    staged: &[PathBuf],
    backups: &[Option<PathBuf>],
    committed: usize,
) {
    for (write, backup) in writes.iter().zip(backups.iter()).take(committed) {
        let restored = match backup {
            Some(backup) => fs::rename(backup, &write.path),
            None => fs::remove_file(&write.path),
        };
        if let Err(e) = restored {
            log::warn!("could not restore {}: {}", write.path.display(), e);
        }
    }
    for backup in backups.iter().skip(committed).flatten() {
        let _ = fs::remove_file(backup);
    }
    for temp in staged.iter().skip(committed) {
        if temp.exists() {
            let _ = fs::remove_file(temp);
        }
    }
}

#[cfg(test)]
#[path = "publish_test.rs"]
mod tests;

//! Clear the output tree before a rebuild.

use crate::debug;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;

/// What a purge removed and what it could not.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// Top-level entries removed completely.
    pub removed: usize,
    /// Individual files or directories that could not be deleted.
    pub failed: usize,
}

/// Delete every top-level entry of `output` not accepted by `is_protected`.
///
/// Best-effort: a failing delete is counted and the purge moves on. A
/// missing output root is created. Symlinks are removed, never followed.
pub fn purge_output<P>(output: &Path, is_protected: P) -> Result<PurgeOutcome>
where
    P: Fn(&str) -> bool,
{
    if !output.exists() {
        fs::create_dir_all(output)
            .with_context(|| format!("failed to create output {}", output.display()))?;
        return Ok(PurgeOutcome::default());
    }

    let entries = fs::read_dir(output)
        .with_context(|| format!("failed to read output {}", output.display()))?;

    let mut outcome = PurgeOutcome::default();
    for entry in entries {
        let Ok(entry) = entry else {
            outcome.failed += 1;
            continue;
        };
        let name = entry.file_name();
        if is_protected(&name.to_string_lossy()) {
            debug!("purge"; "keeping {}", name.to_string_lossy());
            continue;
        }

        let failed = remove_tree(&entry.path());
        if failed == 0 {
            outcome.removed += 1;
        }
        outcome.failed += failed;
    }

    Ok(outcome)
}

/// Remove `path` depth-first, returning how many deletes failed.
fn remove_tree(path: &Path) -> usize {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return 0,
        Err(e) => {
            debug!("purge"; "cannot stat {}: {}", path.display(), e);
            return 1;
        }
    };

    if !metadata.is_dir() {
        return report(path, fs::remove_file(path));
    }

    let mut failed = match fs::read_dir(path) {
        Ok(entries) => entries
            .map(|entry| match entry {
                Ok(entry) => remove_tree(&entry.path()),
                Err(_) => 1,
            })
            .sum(),
        Err(e) => {
            debug!("purge"; "cannot read {}: {}", path.display(), e);
            1
        }
    };
    if failed == 0 {
        failed += report(path, fs::remove_dir(path));
    }
    failed
}

fn report(path: &Path, result: io::Result<()>) -> usize {
    match result {
        Ok(()) => 0,
        Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
        Err(e) => {
            debug!("purge"; "cannot remove {}: {}", path.display(), e);
            1
        }
    }
}

//! File-tree helpers for the build: collecting, copying, atomic writes.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

/// Names never collected or copied.
pub const IGNORED_FILE_NAME: &[&str] = &[".DS_Store"];

// ============================================================================
// Directory Operations
// ============================================================================

/// Recursively collect files under `dir` accepted by `should_collect`.
///
/// Subdirectories are walked in parallel. The result is sorted so callers
/// see a stable order.
pub fn collect_files<P>(dir: &Path, should_collect: &P) -> Result<Vec<PathBuf>>
where
    P: Fn(&Path) -> bool + Sync,
{
    let mut files = collect_files_vec(dir, should_collect)?;
    files.sort();
    Ok(files)
}

fn collect_files_vec<P>(dir: &Path, should_collect: &P) -> Result<Vec<PathBuf>>
where
    P: Fn(&Path) -> bool + Sync,
{
    let paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();

    let parts: Vec<Vec<PathBuf>> = paths
        .par_iter()
        .map(|path| -> Result<Vec<_>> {
            let file_name = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or_default();

            if path.is_dir() {
                collect_files_vec(path, should_collect)
            } else if path.is_file()
                && should_collect(path)
                && !IGNORED_FILE_NAME.contains(&file_name)
            {
                Ok(vec![path.clone()])
            } else {
                Ok(Vec::new())
            }
        })
        .collect::<Result<_>>()?;

    Ok(parts.into_iter().flatten().collect())
}

/// Copy `src` into `dst` recursively, overwriting existing files.
///
/// Returns the number of files copied.
pub fn copy_dir_recursively(src: &Path, dst: &Path) -> Result<usize> {
    let files = collect_files(src, &|_: &Path| true)?;

    files.par_iter().try_for_each(|file| -> Result<()> {
        let relative = file.strip_prefix(src)?;
        let dest = dst.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::copy(file, &dest)
            .with_context(|| format!("failed to copy {} to {}", file.display(), dest.display()))?;
        Ok(())
    })?;

    Ok(files.len())
}

// ============================================================================
// File Writing
// ============================================================================

/// Write `contents` to `path` through a temp file in the same directory.
///
/// Readers see either the old file or the complete new one.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
    temp.write_all(contents)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Temp files are created 0600; published output must be world-readable
        let permissions = fs::metadata(path)
            .map(|m| m.permissions())
            .unwrap_or_else(|_| fs::Permissions::from_mode(0o644));
        temp.as_file().set_permissions(permissions)?;
    }
    temp.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

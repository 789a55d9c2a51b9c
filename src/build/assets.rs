//! Copy the public folder into the output tree.

use crate::debug;
use crate::utils::build::copy_dir_recursively;
use anyhow::{Context, Result};
use std::path::Path;

/// Copy `public` into `output` recursively, overwriting existing files.
///
/// A missing public folder is not an error. Returns the number of files
/// copied.
pub fn copy_public(public: &Path, output: &Path) -> Result<usize> {
    if !public.is_dir() {
        debug!("assets"; "no public folder at {}, skipping", public.display());
        return Ok(0);
    }
    copy_dir_recursively(public, output)
        .with_context(|| format!("failed to copy {}", public.display()))
}

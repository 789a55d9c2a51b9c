//! Render error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while expanding comment commands.
///
/// Malformed or unknown tokens are never errors; they pass through.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template `{name}` not found (looked for {})", path.display())]
    NotFound { name: String, path: PathBuf },

    #[error("cannot evaluate `{expr}`: {message}")]
    Evaluation { expr: String, message: String },

    #[error("failed to read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template `{name}` nested {depth} levels deep (self-inclusion?)")]
    Recursion { name: String, depth: usize },
}

impl RenderError {
    /// Map a template read failure, keeping "not found" distinct.
    pub(crate) fn from_read(name: &str, path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                name: name.to_owned(),
                path,
            }
        } else {
            Self::Io { path, source }
        }
    }
}

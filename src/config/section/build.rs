//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! pages = "src/pages"           # Page sources (*.html), rendered with clean URLs
//! templates = "src/templates"   # Targets of `<!-- #TEMPLATE: name -->`
//! main = "main"                 # Shell template wrapping every page
//! public = "public"             # Copied verbatim into the output
//! output = "docs"               # Build output directory
//! protected = ["css", "js"]     # Output entries kept across rebuilds
//! minify = true                 # Minify HTML output
//! max_depth = 64                # Template nesting limit
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Page source directory.
    pub pages: PathBuf,

    /// Template directory.
    pub templates: PathBuf,

    /// Name of the main template (without `.html`).
    pub main: String,

    /// Public assets directory.
    pub public: PathBuf,

    /// Build output directory.
    pub output: PathBuf,

    /// Top-level output entries the purge step leaves alone.
    pub protected: Vec<String>,

    /// Minify HTML output.
    pub minify: bool,

    /// Maximum template inclusion depth.
    pub max_depth: usize,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            pages: "src/pages".into(),
            templates: "src/templates".into(),
            main: "main".into(),
            public: "public".into(),
            output: "docs".into(),
            protected: vec!["css".into(), "js".into()],
            minify: true,
            max_depth: crate::render::DEFAULT_MAX_DEPTH,
        }
    }
}

impl BuildSectionConfig {
    /// Path of the main template file.
    pub fn main_template(&self) -> PathBuf {
        self.templates.join(format!("{}.html", self.main))
    }

    /// Whether a top-level output entry survives the purge.
    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.iter().any(|p| p == name)
    }

    /// Resolve every directory against `root`.
    pub(crate) fn normalize(&mut self, root: &Path) {
        use crate::utils::path::normalize_path;

        self.pages = normalize_path(&root.join(&self.pages));
        self.templates = normalize_path(&root.join(&self.templates));
        self.public = normalize_path(&root.join(&self.public));
        self.output = normalize_path(&root.join(&self.output));
    }
}

//! Site configuration management for `weave.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [site], [build], [serve], [loop]
//! ├── types/         # ConfigError, global handle
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! The config file is optional: without one, the defaults describe the
//! conventional layout (`src/pages`, `src/templates`, `public` → `docs`)
//! rooted at the current directory.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{BuildSectionConfig, PollConfig, ServeConfig, SiteSectionConfig};
pub use types::{ConfigDiagnostics, ConfigError, cfg, init_config};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    log,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing weave.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteSectionConfig,

    #[serde(default)]
    pub build: BuildSectionConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default, rename = "loop")]
    pub poll: PollConfig,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. When none exists the
    /// defaults are used and the project root is the cwd.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, root) = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                let config = Self::from_path(&path)?;
                let root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                (Self { config_path: path, ..config }, root)
            }
            None => {
                crate::debug!("config"; "{} not found, using defaults", cli.config.display());
                (Self::default(), cwd)
            }
        };

        config.finalize(cli, &root);
        config.validate()?;
        if config.config_path.as_os_str().is_empty() {
            crate::debug!("config"; "project root {}", config.get_root().display());
        } else {
            crate::debug!("config"; "loaded {}", config.config_path.display());
        }
        Ok(config)
    }

    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} (ignored): {}", display_path, fields.join(", "));
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Directories whose changes trigger a rebuild in dev mode.
    ///
    /// Nested roots are dropped since every root is watched recursively.
    pub fn watch_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::new();
        let candidates = [&self.build.pages, &self.build.templates, &self.build.public];
        for candidate in candidates {
            if paths.iter().any(|p| candidate.starts_with(p)) {
                continue;
            }
            paths.retain(|p| !p.starts_with(candidate));
            paths.push(candidate.clone());
        }
        paths
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Resolve paths against `root` and apply CLI overrides.
    fn finalize(&mut self, cli: &Cli, root: &Path) {
        crate::logger::set_verbose(cli.build_args.verbose);

        let root = crate::utils::path::normalize_path(root);
        self.set_root(&root);

        self.apply_build_args(&cli.build_args);
        self.build.normalize(&root);

        match &cli.command {
            Some(Commands::Dev {
                interface,
                port,
                no_open,
            }) => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                if *no_open {
                    self.serve.open = false;
                }
            }
            Some(Commands::Loop { interval }) => {
                Self::update_option(&mut self.poll.interval_secs, interval.as_ref());
            }
            Some(Commands::Build) | None => {}
        }
    }

    /// Apply build arguments from CLI.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        Self::update_option(&mut self.build.minify, args.minify.as_ref());
        Self::update_option(&mut self.build.output, args.output.as_ref());
        Self::update_option(&mut self.build.pages, args.pages.as_ref());
        Self::update_option(&mut self.build.templates, args.templates.as_ref());
        Self::update_option(&mut self.build.public, args.public.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting all errors at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        if self.serve.port == u16::MAX {
            diag.error("serve.port", "must leave room for the push channel on port + 1");
        }
        if self.serve.heartbeat_secs == 0 {
            diag.error("serve.heartbeat_secs", "must be at least 1");
        }
        if self.poll.interval_secs == 0 {
            diag.error("loop.interval_secs", "must be at least 1");
        }
        if self.build.max_depth == 0 {
            diag.error("build.max_depth", "must be at least 1");
        }
        if self.build.main.is_empty() {
            diag.error("build.main", "main template name is empty");
        }

        let output = &self.build.output;
        for (field, dir) in [
            ("build.pages", &self.build.pages),
            ("build.templates", &self.build.templates),
            ("build.public", &self.build.public),
        ] {
            if dir.starts_with(output) {
                diag.error(field, "must not live inside build.output (it is purged on rebuild)");
            } else if output.starts_with(dir) {
                diag.error("build.output", format!("must not live inside {field}"));
            }
        }
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from TOML.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Config rooted at `root` with the default layout, paths already absolute.
#[cfg(test)]
pub fn test_config_at(root: &Path) -> SiteConfig {
    let mut config = SiteConfig::default();
    config.set_root(root);
    config.build.normalize(root);
    config.build.minify = false;
    config
}

// ============================================================================
// tests
// ============================================================================

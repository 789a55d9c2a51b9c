//! Full-site rebuild: purge, main template, pages, public assets.
//!
//! Steps run strictly in order; only page builds run in parallel.

mod assets;
mod purge;

pub use assets::copy_public;
pub use purge::purge_output;

use crate::config::SiteConfig;
use crate::core::BuildMode;
use crate::log;
use crate::logger::ProgressLine;
use crate::page::{self, MainTemplate, PageContext, PageFailure};
use crate::render::{EvalContext, Renderer};
use crate::utils::path::display_relative;
use crate::utils::plural_count;
use anyhow::{Context, Result, bail};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Inputs of one rebuild.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub config: &'a SiteConfig,
    pub mode: BuildMode,
}

impl<'a> BuildContext<'a> {
    pub const fn new(config: &'a SiteConfig, mode: BuildMode) -> Self {
        Self { config, mode }
    }
}

/// What one rebuild did.
#[derive(Debug, Default)]
pub struct RebuildReport {
    /// Written pages, relative to the output root.
    pub pages: Vec<PathBuf>,
    pub failures: Vec<PageFailure>,
    /// Output entries the purge could not delete.
    pub purge_warnings: usize,
    pub assets: usize,
    pub elapsed: Duration,
}

impl RebuildReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// `12 pages, 3 assets in 41ms`
    pub fn summary(&self) -> String {
        format!(
            "{}, {} in {}ms",
            plural_count(self.pages.len(), "page"),
            plural_count(self.assets, "asset"),
            self.elapsed.as_millis()
        )
    }

    /// Turn page failures into one error listing every failed page.
    pub fn into_result(self) -> Result<Self> {
        if self.is_ok() {
            return Ok(self);
        }

        let mut detail = String::new();
        for failure in &self.failures {
            let _ = writeln!(
                detail,
                "  {}: {:#}",
                display_relative(&failure.relative, Path::new("")),
                failure.error
            );
        }
        bail!(
            "{} failed to build\n{}",
            plural_count(self.failures.len(), "page"),
            detail.trim_end()
        )
    }
}

/// Rebuild the whole site. Errs if any page failed, after all were tried.
pub fn rebuild(ctx: &BuildContext<'_>) -> Result<RebuildReport> {
    run(ctx, None)?.into_result()
}

/// Rebuild the whole site, reporting page failures in the report.
///
/// Errors only when a step other than an individual page fails.
pub fn run(ctx: &BuildContext<'_>, progress: Option<&ProgressLine>) -> Result<RebuildReport> {
    let started = Instant::now();
    let config = ctx.config;
    let build = &config.build;

    let purge = purge_output(&build.output, |name| build.is_protected(name))?;
    if purge.failed > 0 {
        log!(
            "warning";
            "{} in {} could not be removed",
            plural_count(purge.failed, "path"),
            build.output.display()
        );
    }

    let renderer = Renderer::from_config(config);
    let eval_ctx = EvalContext::new(&config.site.title, ctx.mode);
    let main = MainTemplate::render(&renderer, &build.main, &eval_ctx)
        .with_context(|| format!("failed to render main template `{}`", build.main))?;

    let page_ctx = PageContext {
        config,
        renderer: &renderer,
        main: &main,
        mode: ctx.mode,
    };
    let outcome = page::build_pages(&page_ctx, progress)?;

    let assets = copy_public(&build.public, &build.output)?;

    Ok(RebuildReport {
        pages: outcome.written,
        failures: outcome.failures,
        purge_warnings: purge.failed,
        assets,
        elapsed: started.elapsed(),
    })
}

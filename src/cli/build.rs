//! One-shot site build.

use crate::build::{self, BuildContext, RebuildReport};
use crate::config::SiteConfig;
use crate::core::BuildMode;
use crate::log;
use crate::logger::ProgressLine;
use crate::page::collect_pages;
use anyhow::Result;

/// Build the site once, with a progress line.
///
/// Errs when any step or page failed; the caller exits non-zero.
pub fn build_site(config: &SiteConfig, mode: BuildMode) -> Result<RebuildReport> {
    let total = collect_pages(&config.build.pages)?.len();
    let progress = ProgressLine::new(&[("pages", total)]);

    let result = build::run(&BuildContext::new(config, mode), Some(&progress));
    progress.finish();

    let report = result?.into_result()?;
    log!("build"; "{}", report.summary());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_site_writes_pages() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/pages")).unwrap();
        fs::create_dir_all(root.join("src/templates")).unwrap();
        fs::write(
            root.join("src/templates/main.html"),
            "<title><!-- #TITLE --></title><!-- #CONTENT -->",
        )
        .unwrap();
        fs::write(root.join("src/pages/about.html"), "<p>about</p>").unwrap();

        let config = test_config_at(root);
        let report = build_site(&config, BuildMode::PRODUCTION).unwrap();
        assert_eq!(report.pages.len(), 1);
        assert!(root.join("docs/about/index.html").is_file());
    }

    #[test]
    fn test_build_site_missing_pages_dir() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        let err = build_site(&config, BuildMode::PRODUCTION).unwrap_err();
        assert!(err.to_string().contains("pages directory not found"));
    }
}

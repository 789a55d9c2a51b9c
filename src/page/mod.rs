//! Page building: wrap each page in the main template and write it.
//!
//! # Module Structure
//!
//! ```text
//! page/
//! ├── title.rs   # TITLE marker extraction and composition
//! ├── route.rs   # Clean-URL output paths
//! └── write.rs   # Minify + atomic write
//! ```
//!
//! A page is rendered independently of the main template; the two meet
//! through the literal `<!-- #TITLE -->` and `<!-- #CONTENT -->`
//! placeholders left in the rendered main template.

mod route;
mod title;
mod write;

pub use route::{output_relative, url_path};
pub use title::page_title;
pub use write::write_page;

use crate::config::SiteConfig;
use crate::core::BuildMode;
use crate::debug;
use crate::logger::ProgressLine;
use crate::render::{EvalContext, RenderError, Renderer};
use crate::utils::build::collect_files;
use crate::utils::path::display_relative;
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

const TITLE_PLACEHOLDER: &str = "<!-- #TITLE -->";
const CONTENT_PLACEHOLDER: &str = "<!-- #CONTENT -->";

// ============================================================================
// main template
// ============================================================================

/// The rendered shell every page of one rebuild is wrapped in.
#[derive(Debug, Clone)]
pub struct MainTemplate {
    html: String,
}

impl MainTemplate {
    /// Render the named template with no page in context.
    pub fn render(
        renderer: &Renderer,
        name: &str,
        ctx: &EvalContext<'_>,
    ) -> Result<Self, RenderError> {
        renderer
            .render_template(name, ctx)
            .map(|html| Self { html })
    }

    #[cfg(test)]
    pub fn from_html(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Fill the first title and content placeholders.
    ///
    /// `title` must already be escaped.
    pub fn compose(&self, title: &str, body: &str) -> String {
        self.html
            .replacen(TITLE_PLACEHOLDER, &format!("<title>{title}</title>"), 1)
            .replacen(CONTENT_PLACEHOLDER, body, 1)
    }
}

// ============================================================================
// page
// ============================================================================

/// One page source, read once per rebuild.
#[derive(Debug)]
pub struct Page {
    /// Path relative to the pages root.
    pub relative: PathBuf,
    pub content: String,
    /// Escaped, composed `<title>` text.
    pub title: String,
    /// Absolute output file.
    pub output: PathBuf,
}

impl Page {
    pub fn load(source: &Path, config: &SiteConfig) -> Result<Self> {
        let relative = source
            .strip_prefix(&config.build.pages)
            .with_context(|| format!("{} is outside the pages directory", source.display()))?
            .to_path_buf();
        let content = fs::read_to_string(source)
            .with_context(|| format!("failed to read {}", source.display()))?;
        let title = page_title(&config.site, &content);
        let output = config.build.output.join(output_relative(&relative));

        Ok(Self {
            relative,
            content,
            title,
            output,
        })
    }
}

// ============================================================================
// building
// ============================================================================

/// Everything a page build reads. Shared by reference across workers.
pub struct PageContext<'a> {
    pub config: &'a SiteConfig,
    pub renderer: &'a Renderer,
    pub main: &'a MainTemplate,
    pub mode: BuildMode,
}

/// A page that could not be built.
#[derive(Debug)]
pub struct PageFailure {
    pub relative: PathBuf,
    pub error: anyhow::Error,
}

/// Result of building every page.
#[derive(Debug, Default)]
pub struct PagesOutcome {
    /// Written output files, relative to the output root.
    pub written: Vec<PathBuf>,
    pub failures: Vec<PageFailure>,
}

/// All `.html` files under the pages root.
pub fn collect_pages(pages: &Path) -> Result<Vec<PathBuf>> {
    if !pages.is_dir() {
        bail!("pages directory not found: {}", pages.display());
    }
    collect_files(pages, &is_page)
}

fn is_page(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "html")
}

/// Build every page in parallel.
///
/// A failing page is recorded and never stops its siblings.
pub fn build_pages(ctx: &PageContext<'_>, progress: Option<&ProgressLine>) -> Result<PagesOutcome> {
    let sources = collect_pages(&ctx.config.build.pages)?;
    Ok(build_sources(ctx, &sources, progress))
}

/// Build the given page sources in parallel.
pub fn build_sources(
    ctx: &PageContext<'_>,
    sources: &[PathBuf],
    progress: Option<&ProgressLine>,
) -> PagesOutcome {
    let results: Vec<(PathBuf, Result<PathBuf>)> = sources
        .par_iter()
        .map(|source| {
            let result = build_page(ctx, source);
            if let Some(p) = progress {
                p.inc("pages");
            }
            (source.clone(), result)
        })
        .collect();

    let mut outcome = PagesOutcome::default();
    for (source, result) in results {
        match result {
            Ok(written) => outcome.written.push(written),
            Err(error) => {
                let relative = source
                    .strip_prefix(&ctx.config.build.pages)
                    .unwrap_or(&source)
                    .to_path_buf();
                outcome.failures.push(PageFailure { relative, error });
            }
        }
    }
    outcome
}

/// Build one page. Returns its output path relative to the output root.
pub fn build_page(ctx: &PageContext<'_>, source: &Path) -> Result<PathBuf> {
    let page = Page::load(source, ctx.config)?;
    let display = display_relative(&page.relative, Path::new(""));

    let eval_ctx = EvalContext::new(&ctx.config.site.title, ctx.mode).for_page(&page.relative);
    let body = ctx
        .renderer
        .render(&page.content, &eval_ctx)
        .with_context(|| format!("failed to render page {display}"))?;

    let html = ctx.main.compose(&page.title, &body);
    write_page(&page.output, &html, ctx.config.build.minify)
        .with_context(|| format!("failed to write page {display}"))?;

    debug!("page"; "{} -> {}", display, url_path(&page.relative));
    Ok(output_relative(&page.relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use crate::render::Evaluators;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    const MAIN: &str = "<html><head><!-- #TITLE --></head><body><!-- #CONTENT --></body></html>";

    fn site() -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        write(&config.build.templates.join("main.html"), MAIN);
        (dir, config)
    }

    fn build(config: &SiteConfig) -> PagesOutcome {
        let renderer = Renderer::new(&config.build.templates, Evaluators::with_builtins());
        let ctx = EvalContext::new(&config.site.title, BuildMode::PRODUCTION);
        let main = MainTemplate::render(&renderer, &config.build.main, &ctx).unwrap();
        let page_ctx = PageContext {
            config,
            renderer: &renderer,
            main: &main,
            mode: BuildMode::PRODUCTION,
        };
        build_pages(&page_ctx, None).unwrap()
    }

    #[test]
    fn test_compose_replaces_first_placeholders_only() {
        let main = MainTemplate::from_html("<!-- #TITLE --><!-- #CONTENT --><!-- #CONTENT -->");
        assert_eq!(
            main.compose("T", "B"),
            "<title>T</title>B<!-- #CONTENT -->"
        );
    }

    #[test]
    fn test_compose_body_placeholders_untouched() {
        let main = MainTemplate::from_html(MAIN);
        let out = main.compose("T", "<!-- #TITLE -->x");
        assert!(out.contains("<title>T</title>"));
        assert!(out.contains("<body><!-- #TITLE -->x</body>"));
    }

    #[test]
    fn test_nested_page_gets_clean_url_and_title() {
        let (_dir, config) = site();
        write(
            &config.build.pages.join("blog/post.html"),
            "<!-- #TITLE: Hello --><p>post</p>",
        );

        let outcome = build(&config);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.written, vec![PathBuf::from("blog/post/index.html")]);

        let html = fs::read_to_string(config.build.output.join("blog/post/index.html")).unwrap();
        assert!(html.contains("<title>Hello · Axónio</title>"));
        assert!(html.contains("<p>post</p>"));
    }

    #[test]
    fn test_index_stays_and_site_title_alone() {
        let (_dir, config) = site();
        write(&config.build.pages.join("index.html"), "<p>home</p>");

        let outcome = build(&config);
        assert_eq!(outcome.written, vec![PathBuf::from("index.html")]);

        let html = fs::read_to_string(config.build.output.join("index.html")).unwrap();
        assert!(html.contains("<title>Axónio</title>"));
    }

    #[test]
    fn test_title_is_escaped() {
        let (_dir, config) = site();
        write(&config.build.pages.join("a.html"), "<!-- #TITLE: A<B> -->");

        build(&config);
        let html = fs::read_to_string(config.build.output.join("a/index.html")).unwrap();
        assert!(html.contains("<title>A&lt;B&gt; · Axónio</title>"));
    }

    #[test]
    fn test_page_evaluators_see_page_path() {
        let (_dir, config) = site();
        write(&config.build.pages.join("docs/intro.html"), "<!-- #EVAL: page -->");

        build(&config);
        let html = fs::read_to_string(config.build.output.join("docs/intro/index.html")).unwrap();
        assert!(html.contains("<body>docs/intro.html</body>"));
    }

    #[test]
    fn test_failure_does_not_stop_siblings() {
        let (_dir, config) = site();
        write(&config.build.pages.join("good.html"), "<p>ok</p>");
        write(&config.build.pages.join("bad.html"), "<!-- #TEMPLATE: missing -->");
        write(&config.build.pages.join("notes.txt"), "ignored");

        let outcome = build(&config);
        assert_eq!(outcome.written, vec![PathBuf::from("good/index.html")]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].relative, PathBuf::from("bad.html"));
        let message = format!("{:#}", outcome.failures[0].error);
        assert!(message.contains("bad.html"));
        assert!(message.contains("missing"));
        assert!(!config.build.output.join("bad/index.html").exists());
    }

    #[test]
    fn test_missing_pages_dir() {
        let dir = TempDir::new().unwrap();
        assert!(collect_pages(&dir.path().join("absent")).is_err());
    }
}

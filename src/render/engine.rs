//! Recursive comment-command expansion.

use super::command::{self, Command};
use super::dispatch;
use super::{EvalContext, Evaluators, RenderError};
use crate::config::SiteConfig;
use rayon::prelude::*;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// Default limit on `TEMPLATE` nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Expands comment commands against a template directory.
///
/// Holds only read-only state, so one renderer is shared by every page
/// and every nested inclusion of a rebuild.
#[derive(Debug)]
pub struct Renderer {
    templates: PathBuf,
    evaluators: Evaluators,
    max_depth: usize,
}

impl Renderer {
    pub fn new(templates: impl Into<PathBuf>, evaluators: Evaluators) -> Self {
        Self {
            templates: templates.into(),
            evaluators,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Renderer for the configured template directory with the built-in
    /// evaluators.
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(&config.build.templates, Evaluators::with_builtins())
            .with_max_depth(config.build.max_depth)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn templates(&self) -> &Path {
        &self.templates
    }

    pub fn evaluators(&self) -> &Evaluators {
        &self.evaluators
    }

    /// `<templates>/<name>.html`
    pub fn template_path(&self, name: &str) -> PathBuf {
        self.templates.join(format!("{name}.html"))
    }

    /// Expand every command in `html`.
    ///
    /// Sibling commands resolve in parallel. The first failure in source
    /// order wins; text outside command tokens is copied verbatim.
    pub fn render(&self, html: &str, ctx: &EvalContext<'_>) -> Result<String, RenderError> {
        self.render_at(html, ctx, 0)
    }

    /// Load and render the named template, as `<!-- #TEMPLATE: name -->`
    /// would.
    pub fn render_template(&self, name: &str, ctx: &EvalContext<'_>) -> Result<String, RenderError> {
        self.include(name, ctx, 0)
    }

    fn render_at(
        &self,
        html: &str,
        ctx: &EvalContext<'_>,
        depth: usize,
    ) -> Result<String, RenderError> {
        let commands = command::scan(html);
        if commands.is_empty() {
            return Ok(html.to_owned());
        }

        let resolved: Vec<Result<Cow<'_, str>, RenderError>> = commands
            .par_iter()
            .map(|cmd| dispatch::resolve(self, cmd, ctx, depth))
            .collect();
        let resolved = resolved.into_iter().collect::<Result<Vec<_>, _>>()?;

        Ok(splice(html, &commands, &resolved))
    }

    /// Render a template one level deeper than its includer.
    pub(super) fn include(
        &self,
        name: &str,
        ctx: &EvalContext<'_>,
        depth: usize,
    ) -> Result<String, RenderError> {
        if depth >= self.max_depth {
            return Err(RenderError::Recursion {
                name: name.to_owned(),
                depth,
            });
        }

        let path = self.template_path(name);
        let source =
            fs::read_to_string(&path).map_err(|e| RenderError::from_read(name, path, e))?;
        self.render_at(&source, ctx, depth + 1)
    }
}

/// Replace each command span with its resolution, in one pass.
fn splice(html: &str, commands: &[Command<'_>], resolved: &[Cow<'_, str>]) -> String {
    let extra: usize = resolved.iter().map(|r| r.len()).sum();
    let mut out = String::with_capacity(html.len() + extra);
    let mut cursor = 0;

    for (cmd, text) in commands.iter().zip(resolved) {
        out.push_str(&html[cursor..cmd.span.start]);
        out.push_str(text);
        cursor = cmd.span.end;
    }
    out.push_str(&html[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BuildMode;
    use std::fs;
    use tempfile::TempDir;

    fn setup(templates: &[(&str, &str)]) -> (TempDir, Renderer) {
        let dir = TempDir::new().unwrap();
        for (name, content) in templates {
            let path = dir.path().join(format!("{name}.html"));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let renderer = Renderer::new(dir.path(), Evaluators::with_builtins());
        (dir, renderer)
    }

    fn ctx() -> EvalContext<'static> {
        EvalContext::new("Site", BuildMode::PRODUCTION)
    }

    #[test]
    fn test_identity_without_commands() {
        let (_dir, renderer) = setup(&[]);
        for html in ["", "<p>plain</p>", "<!-- comment -->", "<!-- #lower -->", "a\nb"] {
            assert_eq!(renderer.render(html, &ctx()).unwrap(), html);
        }
    }

    #[test]
    fn test_surrounding_text_preserved() {
        let (_dir, renderer) = setup(&[("x", "X")]);
        let html = "ä<!-- #TEMPLATE: x -->  é\n<!-- #TEMPLATE: x -->ü";
        assert_eq!(renderer.render(html, &ctx()).unwrap(), "äX  é\nXü");
    }

    #[test]
    fn test_template_inlining() {
        let (_dir, renderer) = setup(&[("nav", "<nav>links</nav>")]);
        let out = renderer
            .render("<body><!-- #TEMPLATE: nav --></body>", &ctx())
            .unwrap();
        assert_eq!(out, "<body><nav>links</nav></body>");
    }

    #[test]
    fn test_nested_templates_and_subdirectories() {
        let (_dir, renderer) = setup(&[
            ("outer", "[<!-- #TEMPLATE: parts/inner -->]"),
            ("parts/inner", "(<!-- #EVAL: site_title -->)"),
        ]);
        let out = renderer.render("<!-- #TEMPLATE: outer -->", &ctx()).unwrap();
        assert_eq!(out, "[(Site)]");
    }

    #[test]
    fn test_results_follow_scan_order() {
        let templates: Vec<(String, String)> =
            (0..32).map(|i| (format!("t{i}"), format!("<{i}>"))).collect();
        let refs: Vec<(&str, &str)> = templates
            .iter()
            .map(|(n, c)| (n.as_str(), c.as_str()))
            .collect();
        let (_dir, renderer) = setup(&refs);

        let html: String = (0..32).map(|i| format!("<!-- #TEMPLATE: t{i} -->,")).collect();
        let expected: String = (0..32).map(|i| format!("<{i}>,")).collect();
        assert_eq!(renderer.render(&html, &ctx()).unwrap(), expected);
    }

    #[test]
    fn test_unknown_commands_pass_through() {
        let (_dir, renderer) = setup(&[("x", "X")]);
        let html = "<!-- #TITLE: T --><!-- #CONTENT --><!-- #TEMPLATE: x --><!-- #WHAT: ever -->";
        assert_eq!(
            renderer.render(html, &ctx()).unwrap(),
            "<!-- #TITLE: T --><!-- #CONTENT -->X<!-- #WHAT: ever -->"
        );
    }

    #[test]
    fn test_idempotent_when_output_has_no_commands() {
        let (_dir, renderer) = setup(&[("x", "<b>X</b>")]);
        let once = renderer.render("a<!-- #TEMPLATE: x -->b", &ctx()).unwrap();
        let twice = renderer.render(&once, &ctx()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_inserted_text_is_not_rescanned() {
        // An evaluator returning a token does not trigger another expansion.
        let mut evaluators = Evaluators::new();
        evaluators.register("token", |_, _| Ok(Some("<!-- #EVAL: token -->".into())));
        let renderer = Renderer::new("/unused", evaluators);
        let out = renderer.render("<!-- #EVAL: token -->", &ctx()).unwrap();
        assert_eq!(out, "<!-- #EVAL: token -->");
    }

    #[test]
    fn test_first_error_in_scan_order() {
        let (_dir, renderer) = setup(&[("ok", "fine")]);
        let html = "<!-- #TEMPLATE: ok --><!-- #TEMPLATE: first --><!-- #EVAL: nope -->";
        let err = renderer.render(html, &ctx()).unwrap_err();
        assert!(matches!(err, RenderError::NotFound { ref name, .. } if name == "first"));
    }

    #[test]
    fn test_nested_error_propagates() {
        let (_dir, renderer) = setup(&[("outer", "<!-- #EVAL: nope -->")]);
        let err = renderer.render("<!-- #TEMPLATE: outer -->", &ctx()).unwrap_err();
        assert!(matches!(err, RenderError::Evaluation { .. }));
    }

    #[test]
    fn test_self_inclusion_hits_depth_limit() {
        let (_dir, renderer) = setup(&[("loop", "<!-- #TEMPLATE: loop -->")]);
        let renderer = renderer.with_max_depth(8);
        let err = renderer.render("<!-- #TEMPLATE: loop -->", &ctx()).unwrap_err();
        assert!(matches!(err, RenderError::Recursion { depth: 8, .. }));
    }

    #[test]
    fn test_render_template() {
        let (_dir, renderer) = setup(&[("main", "<html><!-- #CONTENT --></html>")]);
        let out = renderer.render_template("main", &ctx()).unwrap();
        assert_eq!(out, "<html><!-- #CONTENT --></html>");
        assert!(renderer.render_template("absent", &ctx()).is_err());
    }
}

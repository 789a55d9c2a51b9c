//! Minify and write finished pages.

use crate::utils::build::write_atomic;
use anyhow::Result;
use std::path::Path;

/// Collapse whitespace and drop comments, keeping the markup valid for
/// browsers that expect explicit closing tags.
pub fn minify(html: &str) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    minify_html::minify(html.as_bytes(), &cfg)
}

/// Write a page, creating parent directories.
pub fn write_page(output: &Path, html: &str, minify_output: bool) -> Result<()> {
    if minify_output {
        write_atomic(output, &minify(html))
    } else {
        write_atomic(output, html.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_minify_drops_comments_and_whitespace() {
        let html = "<html>\n  <body>\n    <!-- note -->\n    <p>  a   b  </p>\n  </body>\n</html>";
        let out = String::from_utf8(minify(html)).unwrap();
        assert!(!out.contains("note"));
        assert!(!out.contains("\n  "));
        assert!(!out.contains("  "));
        assert!(out.contains("</p>"));
    }

    #[test]
    fn test_write_page() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("blog/post/index.html");

        write_page(&out, "<p>\n\n x </p>", false).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "<p>\n\n x </p>");

        write_page(&out, "<p>\n\n x </p>", true).unwrap();
        assert!(fs::read_to_string(&out).unwrap().len() < "<p>\n\n x </p>".len());
    }
}

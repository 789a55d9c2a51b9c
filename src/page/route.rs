//! Clean URLs: source path under the pages root to output path.
//!
//! ```text
//! index.html          -> index.html          /
//! about.html          -> about/index.html    /about/
//! blog/post.html      -> blog/post/index.html /blog/post/
//! blog/index.html     -> blog/index.html     /blog/
//! ```

use std::path::{Path, PathBuf};

const INDEX: &str = "index.html";

/// Output path, relative to the output root, for a page source path
/// relative to the pages root.
pub fn output_relative(relative: &Path) -> PathBuf {
    if relative.file_name().is_some_and(|name| name == INDEX) {
        return relative.to_path_buf();
    }
    relative.with_extension("").join(INDEX)
}

/// URL path a page is served at, with leading and trailing slash.
pub fn url_path(relative: &Path) -> String {
    let output = output_relative(relative);
    let dir = output.parent().unwrap_or(Path::new(""));
    let segments = crate::utils::path::display_relative(dir, Path::new(""));
    if segments.is_empty() {
        "/".to_owned()
    } else {
        format!("/{segments}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_relative() {
        assert_eq!(
            output_relative(Path::new("blog/post.html")),
            PathBuf::from("blog/post/index.html")
        );
        assert_eq!(
            output_relative(Path::new("about.html")),
            PathBuf::from("about/index.html")
        );
        assert_eq!(
            output_relative(Path::new("index.html")),
            PathBuf::from("index.html")
        );
        assert_eq!(
            output_relative(Path::new("blog/index.html")),
            PathBuf::from("blog/index.html")
        );
    }

    #[test]
    fn test_url_path() {
        assert_eq!(url_path(Path::new("index.html")), "/");
        assert_eq!(url_path(Path::new("about.html")), "/about/");
        assert_eq!(url_path(Path::new("blog/post.html")), "/blog/post/");
        assert_eq!(url_path(Path::new("blog/index.html")), "/blog/");
    }
}

//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve URL to a file under `serve_root`, mapping directories to `index.html`.
///
/// Returns `None` for anything escaping the root, including via symlinks.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let local = serve_root.join(&clean);

    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Normalize URL: strip query and fragment, decode, trim slashes
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded.replace('\\', "/").trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("docs");
        fs::create_dir_all(root.join("about")).unwrap();
        fs::write(root.join("index.html"), "home").unwrap();
        fs::write(root.join("about/index.html"), "about").unwrap();
        fs::write(root.join("style.css"), "body{}").unwrap();
        fs::write(dir.path().join("secret.txt"), "no").unwrap();
        dir
    }

    #[test]
    fn test_root_and_directories_map_to_index() {
        let dir = site();
        let root = dir.path().join("docs");
        let canonical = root.canonicalize().unwrap();

        assert_eq!(resolve_path("/", &root), Some(canonical.join("index.html")));
        assert_eq!(
            resolve_path("/about/", &root),
            Some(canonical.join("about/index.html"))
        );
        assert_eq!(
            resolve_path("/about?x=1", &root),
            Some(canonical.join("about/index.html"))
        );
        assert_eq!(resolve_path("/style.css", &root), Some(canonical.join("style.css")));
    }

    #[test]
    fn test_missing_is_none() {
        let dir = site();
        assert_eq!(resolve_path("/nope/", &dir.path().join("docs")), None);
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = site();
        let root = dir.path().join("docs");
        assert_eq!(resolve_path("/../secret.txt", &root), None);
        assert_eq!(resolve_path("/%2e%2e/secret.txt", &root), None);
        assert_eq!(resolve_path("/about/..%2F..%2Fsecret.txt", &root), None);
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("/a%20b/"), "a b");
        assert_eq!(normalize_url("/x#frag"), "x");
        assert_eq!(normalize_url("/"), "");
    }
}

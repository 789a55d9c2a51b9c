//! Page titles from `<!-- #TITLE: ... -->` markers.

use crate::config::SiteSectionConfig;
use crate::render::{command, names};
use crate::utils::html::escape;

/// Argument of the first `TITLE` marker carrying one.
pub fn extract_title(source: &str) -> Option<&str> {
    command::find_argument(source, names::TITLE)
}

/// Escaped `<page> <sep> <site>` title for the `<title>` element.
pub fn page_title(site: &SiteSectionConfig, source: &str) -> String {
    escape(&site.compose_title(extract_title(source))).into_owned()
}

//! `[site]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "Axónio"      # Appended to every page title
//! separator = "·"       # Between the page title and the site title
//! ```

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Fixed site title, used alone when a page has no `TITLE` marker.
    pub title: String,

    /// Separator placed between page title and site title.
    pub separator: String,
}

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            title: "Axónio".into(),
            separator: "·".into(),
        }
    }
}

impl SiteSectionConfig {
    /// Compose `<page> <sep> <site>`, or the site title alone.
    ///
    /// The result is not escaped.
    pub fn compose_title(&self, page_title: Option<&str>) -> String {
        match page_title {
            Some(title) => format!("{} {} {}", title, self.separator, self.title),
            None => self.title.clone(),
        }
    }
}

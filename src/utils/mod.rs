//! Shared helpers: HTML escaping, MIME guessing, path handling, file trees.

pub mod build;
pub mod date;
pub mod html;
pub mod mime;
pub mod path;
mod plural;

pub use plural::{plural_count, plural_s};

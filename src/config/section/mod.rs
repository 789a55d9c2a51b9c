//! Configuration section definitions.
//!
//! Each module corresponds to a section in `weave.toml`:
//!
//! | Module  | TOML Section | Purpose                                  |
//! |---------|--------------|------------------------------------------|
//! | `site`  | `[site]`     | Site title and title separator           |
//! | `build` | `[build]`    | Source/output paths, minify, protection  |
//! | `serve` | `[serve]`    | Dev server, push channel heartbeat       |
//! | `poll`  | `[loop]`     | Timer-driven rebuild interval            |

mod build;
mod poll;
mod serve;
mod site;

pub use build::BuildSectionConfig;
pub use poll::PollConfig;
pub use serve::ServeConfig;
pub use site::SiteSectionConfig;

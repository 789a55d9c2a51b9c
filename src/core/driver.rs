//! Build mode for one-shot, dev and loop builds.

/// Build mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Name exposed to `EVAL: mode`.
    pub name: &'static str,
}

impl BuildMode {
    /// One-shot build.
    pub const PRODUCTION: Self = Self { name: "production" };

    /// `dev` mode: watcher + push channel.
    pub const DEVELOPMENT: Self = Self { name: "development" };

    /// `loop` mode: timer-driven rebuilds, nothing served.
    pub const POLLING: Self = Self { name: "loop" };
}

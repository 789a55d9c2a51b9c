//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::BuildMode;

/// Weave static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: weave.toml, searched upward from cwd)
    #[arg(short = 'C', long, global = true, default_value = "weave.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    #[command(flatten)]
    pub build_args: BuildArgs,

    /// subcommands (default: build)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the site once
    #[command(visible_alias = "b")]
    Build,

    /// Serve the output with live reload, rebuilding on every change
    #[command(visible_alias = "d")]
    Dev {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on (push channel uses port + 1)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open the site in the default browser
        #[arg(long)]
        no_open: bool,
    },

    /// Rebuild on a fixed timer, without watching or serving
    #[command(visible_alias = "l")]
    Loop {
        /// Seconds between rebuilds
        #[arg(short = 'n', long)]
        interval: Option<u64>,
    },
}

/// Build arguments shared by every mode
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Output directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Pages directory path (relative to project root)
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub pages: Option<PathBuf>,

    /// Templates directory path (relative to project root)
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub templates: Option<PathBuf>,

    /// Public assets directory path (relative to project root)
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub public: Option<PathBuf>,

    /// Minify the HTML output
    #[arg(short, long, global = true, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Build mode implied by the subcommand.
    pub const fn mode(&self) -> BuildMode {
        match self.command {
            Some(Commands::Dev { .. }) => BuildMode::DEVELOPMENT,
            Some(Commands::Loop { .. }) => BuildMode::POLLING,
            Some(Commands::Build) | None => BuildMode::PRODUCTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_build() {
        let cli = Cli::parse_from(["weave"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.mode(), BuildMode::PRODUCTION);
        assert_eq!(cli.config, PathBuf::from("weave.toml"));
    }

    #[test]
    fn test_dev_args() {
        let cli = Cli::parse_from(["weave", "dev", "-p", "3000", "--no-open", "-v"]);
        assert_eq!(cli.mode(), BuildMode::DEVELOPMENT);
        assert!(cli.build_args.verbose);
        match cli.command {
            Some(Commands::Dev { port, no_open, .. }) => {
                assert_eq!(port, Some(3000));
                assert!(no_open);
            }
            _ => panic!("expected dev"),
        }
    }

    #[test]
    fn test_loop_args_with_global_output() {
        let cli = Cli::parse_from(["weave", "loop", "-n", "10", "--output", "site"]);
        assert_eq!(cli.build_args.output, Some(PathBuf::from("site")));
        assert_eq!(cli.mode(), BuildMode::POLLING);
    }

    #[test]
    fn test_minify_flag_forms() {
        let cli = Cli::parse_from(["weave", "build", "--minify", "false"]);
        assert_eq!(cli.build_args.minify, Some(false));
        let cli = Cli::parse_from(["weave", "build", "-m"]);
        assert_eq!(cli.build_args.minify, Some(true));
    }
}

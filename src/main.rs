//! Weave - a static site generator driven by HTML comment commands.

mod actor;
mod build;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod page;
mod reload;
mod render;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{SiteConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = init_config(SiteConfig::load(&cli)?);

    match &cli.command {
        None | Some(Commands::Build) => {
            cli::build::build_site(&config, cli.mode())?;
        }
        Some(Commands::Dev { .. }) => cli::serve::serve_site(config)?,
        Some(Commands::Loop { .. }) => cli::poll::run_loop(&config),
    }
    Ok(())
}

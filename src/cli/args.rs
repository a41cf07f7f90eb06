//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Invalidate CDN caches for a generated static site
#[derive(Parser, Debug)]
#[command(
    name = "cdnpurge",
    version = env!("CARGO_PKG_VERSION"),
    about = "Invalidate CDN caches for a generated static site",
    long_about = "Select the files of a built site and ask every configured CDN to purge them.",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = "Quick Start:\n  $ cdnpurge init          # Write an example cdn.toml\n  $ cdnpurge invalidate    # Purge every file under build/\n  $ cdnpurge inv --filter '\\.html$'"
)]
pub struct Cli {
    /// Path to a custom cdn.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Invalidate the built site on every configured CDN
    #[command(
        visible_alias = "inv",
        about = "Purge the built site from every configured CDN",
        after_help = "Examples:\n  cdnpurge invalidate\n  cdnpurge inv --filter '\\.html$'\n  cdnpurge inv --build-dir public --strict"
    )]
    Invalidate {
        /// Regex over build-relative paths (overrides settings)
        #[arg(long)]
        filter: Option<String>,

        /// Build output directory (overrides settings)
        #[arg(long, value_name = "DIR")]
        build_dir: Option<PathBuf>,

        /// Exit nonzero when any provider fails
        #[arg(long)]
        strict: bool,
    },

    /// Build hook: invalidate only when `after_build = true`
    #[command(about = "Invalidate if after_build is enabled in cdn.toml")]
    AfterBuild,

    /// Write an example cdn.toml
    #[command(about = "Write an example cdn.toml to the current directory")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration
    #[command(about = "Display active settings and the example configuration")]
    Config,
}

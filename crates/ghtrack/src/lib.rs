//! Library interface for the `ghtrack` CLI.
//!
//! This crate exposes the CLI's argument parser and command structure as a library,
//! primarily for documentation generation and testing. The actual entry point is
//! in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`Commands`] - Available subcommands
//! - [`commands`] - Command implementations
//! - [`terminal`] - Console and progress output
//!
//! # Documentation Generation
//!
//! The [`command()`] function returns the clap `Command` for generating man pages
//! and shell completions via `xtask`.

pub mod commands;

pub mod terminal;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use commands::collect::StatsArgs;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {}
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG                Log filter (e.g., debug, ghtrack_core=trace)
    GHTRACK_LOG_PATH        Explicit log file path
    GHTRACK_LOG_DIR         Log directory
    GHTRACK_ACCESS_TOKEN    Access token (same as --access-token)
";

/// Command-line interface definition for ghtrack.
#[derive(Parser)]
#[command(name = "ghtrack")]
#[command(about = "Monthly per-user GitHub activity for an organization", long_about = None)]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Print only the JSON report (for scripting)
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available subcommands for the CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Count commits per user and repository
    Commits(StatsArgs),

    /// Count pull requests reviewed per user and repository
    Reviews(StatsArgs),

    /// Count open pull requests opened per user and repository
    Prs(StatsArgs),

    /// Count open issues opened per user and repository
    Issues(StatsArgs),

    /// Validate arguments and exit without collecting
    Stats(StatsArgs),
}

impl Commands {
    /// The core subcommand and its arguments.
    pub fn into_parts(self) -> (ghtrack_core::Subcommand, StatsArgs) {
        use ghtrack_core::Subcommand as Sub;
        match self {
            Self::Commits(args) => (Sub::Commits, args),
            Self::Reviews(args) => (Sub::Reviews, args),
            Self::Prs(args) => (Sub::Prs, args),
            Self::Issues(args) => (Sub::Issues, args),
            Self::Stats(args) => (Sub::Stats, args),
        }
    }
}

/// Returns the clap command for documentation generation
pub fn command() -> clap::Command {
    Cli::command()
}

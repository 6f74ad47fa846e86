//! Command line argument definitions.

use crate::models::config::{EpisodePadding, LibraryLayout, ProviderKind};
use crate::models::job::SortMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Plex Sorter - Sort video files into a Plex library
#[derive(Parser, Debug)]
#[command(name = "plex-sorter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    /// Path to config.toml (default: user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sort video files from SOURCE into a library at DEST
    Sort(SortArgs),

    /// Check configuration and provider connectivity
    Check {
        /// Metadata provider to check (overrides config)
        #[arg(long, value_enum)]
        provider: Option<ProviderKind>,
    },
}

#[derive(clap::Args, Debug)]
pub struct SortArgs {
    /// Source directory containing video files
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Destination library root
    #[arg(value_name = "DEST")]
    pub destination: PathBuf,

    /// Which files to sort
    #[arg(long, value_enum, default_value_t = SortMode::Both)]
    pub mode: SortMode,

    /// Copy files instead of moving them
    #[arg(long)]
    pub keep: bool,

    /// Metadata provider (overrides config)
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Library layout (overrides config)
    #[arg(long, value_enum)]
    pub layout: Option<LibraryLayout>,

    /// Episode number padding (overrides config)
    #[arg(long, value_enum)]
    pub padding: Option<EpisodePadding>,

    /// Fetch full details for every search result
    #[arg(long)]
    pub prefetch: bool,

    /// Skip ambiguous files instead of prompting
    #[arg(long)]
    pub auto_skip: bool,

    /// Print the final run report as JSON
    #[arg(long)]
    pub json: bool,
}

//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::commands::Command;

/// Manage a movie and series catalog stored on the local filesystem.
#[derive(Parser, Debug)]
#[command(name = "reelbase")]
#[command(author, version = env!("REELBASE_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the catalog lives and how it pages.
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Catalog data directory (defaults to the platform data directory)
    #[arg(long, env = "REELBASE_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Page size for listings without --limit
    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    /// Largest page size a listing may request
    #[arg(long, global = true)]
    pub max_page_size: Option<u32>,
}

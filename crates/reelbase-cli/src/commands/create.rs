//! Create command implementation.

use anyhow::{Context, Result};
use clap::Args;

use reelbase_core::RecordInput;

use crate::output;
use crate::store::Catalog;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Title of the movie or series
    #[arg(long)]
    pub title: Option<String>,

    /// Free-text description
    #[arg(long)]
    pub description: Option<String>,

    /// Kind of entry: movie or series (default: movie)
    #[arg(long)]
    pub kind: Option<String>,

    /// Release year
    #[arg(long)]
    pub year: Option<i32>,

    /// JSON file with the record fields (use - for stdin); flags override it
    #[arg(long)]
    pub json: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(repo: &Catalog, args: CreateArgs) -> Result<()> {
    let mut input: RecordInput = match &args.json {
        Some(path) => super::read_json(path)?,
        None => RecordInput::default(),
    };

    if args.title.is_some() {
        input.title = args.title;
    }
    if args.description.is_some() {
        input.description = args.description;
    }
    if args.kind.is_some() {
        input.kind = args.kind;
    }
    if args.year.is_some() {
        input.year = args.year;
    }

    let record = repo
        .create(input)
        .await
        .context("Failed to create record")?;

    output::json(&record, args.pretty)?;
    output::success(&format!("Created record {}", record.id));

    Ok(())
}

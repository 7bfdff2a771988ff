//! List command implementation.

use anyhow::{Context, Result};
use clap::Args;
use futures_util::TryStreamExt;

use reelbase_core::{Cursor, Kind, ListFilter, Pagination};

use crate::output;
use crate::store::Catalog;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only movies or only series
    #[arg(long)]
    pub kind: Option<String>,

    /// Earliest release year (inclusive)
    #[arg(long)]
    pub year_from: Option<i32>,

    /// Latest release year (inclusive)
    #[arg(long)]
    pub year_to: Option<i32>,

    /// Case-insensitive title substring
    #[arg(long)]
    pub title: Option<String>,

    /// Maximum number of records to return
    #[arg(long)]
    pub limit: Option<u32>,

    /// Pagination cursor from a previous listing
    #[arg(long, conflicts_with = "offset")]
    pub cursor: Option<String>,

    /// Number of records to skip
    #[arg(long)]
    pub offset: Option<usize>,

    /// Walk every page instead of printing one
    #[arg(long, conflicts_with_all = ["cursor", "offset", "limit"])]
    pub all: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(repo: &Catalog, args: ListArgs) -> Result<()> {
    let filter = ListFilter {
        kind: args
            .kind
            .as_deref()
            .map(str::parse::<Kind>)
            .transpose()
            .context("Invalid kind")?,
        year_from: args.year_from,
        year_to: args.year_to,
        title_contains: args.title.clone(),
    };

    if args.all {
        let mut records = std::pin::pin!(repo.records(filter));
        let mut count = 0usize;
        while let Some(record) = records.try_next().await.context("Failed to list records")? {
            output::json(&record, args.pretty)?;
            count += 1;
        }
        if count == 0 {
            output::note("No records found.");
        }
        return Ok(());
    }

    let cursor = args
        .cursor
        .as_deref()
        .map(Cursor::decode)
        .transpose()
        .context("Invalid cursor")?;
    let pagination = Pagination {
        cursor,
        offset: args.offset,
        limit: args.limit,
    };

    let page = repo
        .list(filter, pagination)
        .await
        .context("Failed to list records")?;

    if page.records.is_empty() {
        output::note("No records found.");
    }

    for record in &page.records {
        output::json(record, args.pretty)?;
    }

    if let Some(cursor) = &page.next_cursor {
        output::note(&format!("Next cursor: {}", cursor));
    }

    Ok(())
}

//! Get command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::store::Catalog;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Record id
    pub id: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(repo: &Catalog, args: GetArgs) -> Result<()> {
    let id = super::parse_id(&args.id)?;
    let record = repo.get(&id).await.context("Failed to get record")?;
    output::json(&record, args.pretty)
}

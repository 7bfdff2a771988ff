//! Delete command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::store::Catalog;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Record id
    pub id: String,
}

pub async fn run(repo: &Catalog, args: DeleteArgs) -> Result<()> {
    let id = super::parse_id(&args.id)?;
    repo.delete(&id).await.context("Failed to delete record")?;
    output::success(&format!("Deleted record {}", id));
    Ok(())
}

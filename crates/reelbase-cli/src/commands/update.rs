//! Update command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use reelbase_core::RecordPatch;

use crate::output;
use crate::store::Catalog;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Record id
    pub id: String,

    /// The record version you last saw; the update fails if it moved on
    #[arg(long, value_name = "VERSION")]
    pub expected_version: u64,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New description
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,

    /// New kind: movie or series
    #[arg(long)]
    pub kind: Option<String>,

    /// New release year
    #[arg(long, conflicts_with = "clear_year")]
    pub year: Option<i32>,

    /// Remove the release year
    #[arg(long)]
    pub clear_year: bool,

    /// JSON file with patch fields (use - for stdin); flags override it
    #[arg(long)]
    pub json: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl UpdateArgs {
    fn patch(&self) -> Result<RecordPatch> {
        let mut patch: RecordPatch = match &self.json {
            Some(path) => super::read_json(path)?,
            None => RecordPatch::default(),
        };

        if let Some(title) = &self.title {
            patch = patch.with_title(title);
        }
        if let Some(description) = &self.description {
            patch = patch.with_description(description);
        }
        if self.clear_description {
            patch = patch.without_description();
        }
        if let Some(kind) = &self.kind {
            patch = patch.with_kind(kind);
        }
        if let Some(year) = self.year {
            patch = patch.with_year(year);
        }
        if self.clear_year {
            patch = patch.without_year();
        }

        Ok(patch)
    }
}

pub async fn run(repo: &Catalog, args: UpdateArgs) -> Result<()> {
    let id = super::parse_id(&args.id)?;
    let patch = args.patch()?;

    if patch.is_empty() {
        bail!("Nothing to update. Pass at least one field to change.");
    }

    let record = repo
        .update(&id, args.expected_version, patch)
        .await
        .context("Failed to update record")?;

    output::json(&record, args.pretty)?;
    output::success(&format!(
        "Updated record {} to version {}",
        record.id, record.version
    ));

    Ok(())
}

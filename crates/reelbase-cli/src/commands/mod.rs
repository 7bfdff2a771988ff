//! Catalog subcommand implementations.

mod create;
mod delete;
mod get;
mod list;
mod update;

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::de::DeserializeOwned;

use reelbase_core::RecordId;

use crate::store::Catalog;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a movie or series to the catalog
    Create(create::CreateArgs),

    /// Fetch a single record
    Get(get::GetArgs),

    /// List records, newest first
    List(list::ListArgs),

    /// Change a record, guarded by the version you last saw
    Update(update::UpdateArgs),

    /// Permanently delete a record
    Delete(delete::DeleteArgs),
}

pub async fn handle(repo: &Catalog, cmd: Command) -> Result<()> {
    match cmd {
        Command::Create(args) => create::run(repo, args).await,
        Command::Get(args) => get::run(repo, args).await,
        Command::List(args) => list::run(repo, args).await,
        Command::Update(args) => update::run(repo, args).await,
        Command::Delete(args) => delete::run(repo, args).await,
    }
}

fn parse_id(id: &str) -> Result<RecordId> {
    RecordId::new(id).context("Invalid record id")
}

/// Read a JSON document from a file, or stdin when the path is `-`.
fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        serde_json::from_str(&buf).context("Invalid JSON from stdin")
    } else {
        let content = std::fs::read_to_string(path).context("Failed to read JSON file")?;
        serde_json::from_str(&content).context("Invalid JSON in file")
    }
}

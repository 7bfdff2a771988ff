//! Opening the catalog from CLI settings.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use reelbase_core::{CatalogRepository, RepositoryConfig};
use reelbase_file::{FileAdapter, FileAdapterConfig};

use crate::cli::StoreArgs;

/// The repository type every command works against.
pub type Catalog = CatalogRepository<FileAdapter>;

/// Get the default data directory.
fn default_data_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "reelbase").context("Could not determine data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Open the catalog described by the store arguments.
pub fn open(args: &StoreArgs) -> Result<Catalog> {
    let root = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => default_data_dir()?,
    };
    fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create data directory {}", root.display()))?;

    let defaults = RepositoryConfig::default();
    let config = RepositoryConfig {
        default_page_size: args.page_size.unwrap_or(defaults.default_page_size),
        max_page_size: args.max_page_size.unwrap_or(defaults.max_page_size),
    };

    debug!(root = %root.display(), ?config, "Opening catalog");

    let adapter = FileAdapter::new(FileAdapterConfig::new(&root));
    CatalogRepository::with_config(adapter, config).context("Invalid page size settings")
}

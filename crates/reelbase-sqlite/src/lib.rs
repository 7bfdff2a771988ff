//! reelbase-sqlite - Relational adapter backed by SQLite.
//!
//! Records live in one `catalog_record` table. Updates are a conditional
//! `UPDATE ... WHERE id = ? AND version = ?` inside a transaction, so the
//! row lock and the version check are taken together.

mod adapter;
mod config;
mod row;
mod schema;

pub use adapter::SqliteAdapter;
pub use config::SqliteAdapterConfig;

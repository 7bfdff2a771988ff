//! reelbase-file - Filesystem document-store adapter.
//!
//! Each record is one JSON document under `<root>/records/`. A lock file
//! at `<root>/store.lock` serializes writers across processes.

mod adapter;
mod config;
mod store;

pub use adapter::FileAdapter;
pub use config::FileAdapterConfig;

//! reelbase-core - Core catalog types, the storage adapter contract and
//! the catalog repository.

pub mod concurrency;
pub mod config;
pub mod error;
pub mod query;
pub mod record;
pub mod repository;
pub mod traits;
pub mod types;

pub use concurrency::{ConcurrencyController, Mutator, check_version};
pub use config::RepositoryConfig;
pub use error::{AdapterError, Error, ValidationError};
pub use query::{ListFilter, ListPage, Pagination, listing_order, paginate};
pub use record::{CatalogRecord, RecordDraft, RecordInput, RecordPatch, validate};
pub use repository::CatalogRepository;
pub use traits::{Clock, ManualClock, StorageAdapter, SystemClock};
pub use types::{Cursor, Kind, RecordId};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

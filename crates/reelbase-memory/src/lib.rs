//! reelbase-memory - In-memory reference storage adapter.

mod adapter;

pub use adapter::MemoryAdapter;

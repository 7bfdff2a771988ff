//! Core traits for storage backends and time.

mod adapter;
mod clock;

pub use adapter::StorageAdapter;
pub use clock::{Clock, ManualClock, SystemClock};

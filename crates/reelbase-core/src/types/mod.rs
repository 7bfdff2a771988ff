//! Core catalog types.
//!
//! These types enforce their invariants at construction time,
//! so an invalid id, kind or cursor cannot be passed to an adapter.

mod cursor;
mod kind;
mod record_id;

pub use cursor::Cursor;
pub use kind::Kind;
pub use record_id::RecordId;

//! The catalog record model and its validation rules.
//!
//! [`RecordInput`] and [`RecordPatch`] are the untyped candidates handed in
//! by callers; [`validate`] and [`validate_patch`] turn them into a typed
//! [`RecordDraft`] or a [`ValidationError`](crate::error::ValidationError).

mod input;
mod model;
mod validate;

pub use input::{RecordInput, RecordPatch};
pub use model::{CatalogRecord, RecordDraft};
pub use validate::{MIN_YEAR, merge, validate, validate_patch, year_bounds};

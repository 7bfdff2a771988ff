//! Error types for reelbase.
//!
//! This module provides a unified error type with explicit variants for
//! input validation, adapter contract failures, and backend availability.
//! Callers match on the variants to tell "nothing there" apart from
//! "someone else changed it first".

use thiserror::Error;

use crate::types::RecordId;

/// The unified error type for reelbase operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input validation errors, raised before any adapter call.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Adapter contract errors (missing record, stale version, duplicate id).
    #[error("{0}")]
    Adapter(#[from] AdapterError),

    /// The storage backend could not be reached or failed mid-operation.
    ///
    /// This is the only class of error that is safe to retry.
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },

    /// Anything unclassified: corrupt stored data, poisoned locks.
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Record and query validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Title is absent, empty or only whitespace.
    #[error("title is required")]
    MissingTitle,

    /// Year is outside `[min, max]`.
    #[error("year {year} is outside the allowed range {min}..={max}")]
    InvalidYear { year: i32, min: i32, max: i32 },

    /// Kind is not one of the known values.
    #[error("unknown kind '{value}' (expected 'movie' or 'series')")]
    InvalidKind { value: String },

    /// A record id could not be parsed.
    #[error("invalid record id '{value}': {reason}")]
    InvalidId { value: String, reason: String },

    /// Page size is zero or above the configured maximum.
    #[error("limit {limit} is outside the allowed range 1..={max}")]
    InvalidLimit { limit: u32, max: u32 },

    /// A pagination cursor was not produced by this store.
    #[error("invalid cursor '{value}'")]
    InvalidCursor { value: String },

    /// Pagination parameters that cannot be combined.
    #[error("invalid pagination: {reason}")]
    InvalidPagination { reason: String },

    /// `year_from` is after `year_to`.
    #[error("year range {from}..={to} is empty")]
    InvalidYearRange { from: i32, to: i32 },
}

/// Errors surfaced by storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// A record with this id is already stored.
    #[error("record {id} already exists")]
    DuplicateId { id: RecordId },

    /// No record with this id is stored.
    #[error("record {id} not found")]
    NotFound { id: RecordId },

    /// The stored version is not the version the caller last observed.
    #[error("version conflict on record {id}: expected {expected}, found {actual}")]
    VersionConflict {
        id: RecordId,
        expected: u64,
        actual: u64,
    },
}

impl Error {
    /// Build an [`Error::Unavailable`] from any displayable cause.
    pub fn unavailable(cause: impl std::fmt::Display) -> Self {
        Error::Unavailable {
            message: cause.to_string(),
        }
    }

    /// Build an [`Error::Internal`] from any displayable cause.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        Error::Internal {
            message: cause.to_string(),
        }
    }

    /// Returns true if the record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Adapter(AdapterError::NotFound { .. }))
    }

    /// Returns true if the caller's version token was stale.
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Error::Adapter(AdapterError::VersionConflict { .. }))
    }

    /// Returns true if a caller may retry the operation with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Unavailable { .. })
    }

    /// The status code an HTTP front-end should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Adapter(AdapterError::NotFound { .. }) => 404,
            Error::Adapter(AdapterError::VersionConflict { .. }) => 409,
            Error::Adapter(AdapterError::DuplicateId { .. }) => 409,
            Error::Unavailable { .. } => 503,
            Error::Internal { .. } => 500,
        }
    }

    /// A message safe to show to an external caller.
    ///
    /// Backend details are withheld for unavailable and internal errors;
    /// those should be logged with full context instead.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(_) | Error::Adapter(_) => self.to_string(),
            Error::Unavailable { .. } => "storage temporarily unavailable".to_string(),
            Error::Internal { .. } => "internal error".to_string(),
        }
    }
}

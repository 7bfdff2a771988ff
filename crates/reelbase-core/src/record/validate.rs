//! Pure validation rules for records and patches.

use chrono::{DateTime, Datelike, Utc};

use crate::error::ValidationError;
use crate::types::Kind;

use super::{CatalogRecord, RecordDraft, RecordInput, RecordPatch};

/// The earliest accepted release year.
pub const MIN_YEAR: i32 = 1888;

/// How many years past the current one a release may be announced for.
const MAX_YEARS_AHEAD: i32 = 5;

/// The inclusive range of accepted years relative to `now`.
pub fn year_bounds(now: DateTime<Utc>) -> (i32, i32) {
    (MIN_YEAR, now.year() + MAX_YEARS_AHEAD)
}

/// Validate a record candidate.
///
/// Checks run in field order (title, kind, year) and the first failure is
/// returned. `now` fixes the upper bound for `year`.
pub fn validate(
    candidate: &RecordInput,
    now: DateTime<Utc>,
) -> Result<RecordDraft, ValidationError> {
    let title = check_title(candidate.title.as_deref())?;
    let kind = match candidate.kind.as_deref() {
        Some(kind) => kind.parse()?,
        None => Kind::default(),
    };
    if let Some(year) = candidate.year {
        check_year(year, now)?;
    }

    Ok(RecordDraft {
        title,
        description: candidate.description.clone(),
        kind,
        year: candidate.year,
    })
}

/// Validate only the fields a patch provides.
pub fn validate_patch(patch: &RecordPatch, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if let Some(title) = patch.title.as_deref() {
        check_title(Some(title))?;
    }
    if let Some(kind) = patch.kind.as_deref() {
        kind.parse::<Kind>()?;
    }
    if let Some(Some(year)) = patch.year {
        check_year(year, now)?;
    }
    Ok(())
}

/// Apply a patch on top of a stored record and validate the result.
pub fn merge(
    current: &CatalogRecord,
    patch: &RecordPatch,
    now: DateTime<Utc>,
) -> Result<RecordDraft, ValidationError> {
    let mut candidate = RecordInput {
        title: Some(current.title.clone()),
        description: current.description.clone(),
        kind: Some(current.kind.as_str().to_string()),
        year: current.year,
    };

    if let Some(title) = &patch.title {
        candidate.title = Some(title.clone());
    }
    if let Some(description) = &patch.description {
        candidate.description = description.clone();
    }
    if let Some(kind) = &patch.kind {
        candidate.kind = Some(kind.clone());
    }
    if let Some(year) = patch.year {
        candidate.year = year;
    }

    validate(&candidate, now)
}

fn check_title(title: Option<&str>) -> Result<String, ValidationError> {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ => Err(ValidationError::MissingTitle),
    }
}

fn check_year(year: i32, now: DateTime<Utc>) -> Result<(), ValidationError> {
    let (min, max) = year_bounds(now);
    if (min..=max).contains(&year) {
        Ok(())
    } else {
        Err(ValidationError::InvalidYear { year, min, max })
    }
}

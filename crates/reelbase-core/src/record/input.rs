//! Caller-supplied record candidates.

use serde::{Deserialize, Deserializer, Serialize};

/// A candidate for a new record, as received from an outer layer.
///
/// Every field is optional and untyped here; [`validate`](super::validate)
/// decides whether it forms a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl RecordInput {
    /// A candidate with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }
}

/// A partial update to a record's content fields.
///
/// `None` leaves a field untouched. For the clearable fields, `Some(None)`
/// removes the value; in JSON that is an explicit `null`, while an absent
/// key leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<Option<i32>>,
}

impl RecordPatch {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn without_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(Some(year));
        self
    }

    pub fn without_year(mut self) -> Self {
        self.year = Some(None);
        self
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.kind.is_none()
            && self.year.is_none()
    }
}

// A key that is present maps to `Some`, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch: RecordPatch = serde_json::from_value(json!({ "year": null })).unwrap();
        assert_eq!(patch.year, Some(None));
        assert_eq!(patch.description, None);

        let patch: RecordPatch = serde_json::from_value(json!({ "year": 2022 })).unwrap();
        assert_eq!(patch.year, Some(Some(2022)));
    }

    #[test]
    fn empty_patch() {
        let patch: RecordPatch = serde_json::from_value(json!({})).unwrap();
        assert!(patch.is_empty());
        assert!(!RecordPatch::default().without_year().is_empty());
    }

    #[test]
    fn input_accepts_partial_json() {
        let input: RecordInput =
            serde_json::from_value(json!({ "title": "Dune", "year": 2021 })).unwrap();
        assert_eq!(input, RecordInput::new("Dune").with_year(2021));
    }
}

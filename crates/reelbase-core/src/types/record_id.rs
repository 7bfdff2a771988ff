//! Record identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::{Error, ValidationError};

/// Maximum accepted length of a record id.
const MAX_LEN: usize = 64;

/// An opaque, validated catalog record identifier.
///
/// Ids are generated by the repository as random 128-bit values rendered
/// as 32 lowercase hex characters. Ids coming from callers are accepted if
/// they are 1-64 characters of `[A-Za-z0-9_-]`, so they can double as
/// file names in document-store backends.
///
/// # Example
///
/// ```
/// use reelbase_core::RecordId;
///
/// let id = RecordId::new("7c9e6679742540de944be07fc1f90ae7").unwrap();
/// assert_eq!(id.as_str(), "7c9e6679742540de944be07fc1f90ae7");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Create a record id from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidId`] if the string is not a valid id.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidId {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        if s.is_empty() {
            return Err(invalid("cannot be empty"));
        }

        if s.len() > MAX_LEN {
            return Err(invalid("exceeds maximum length of 64 characters"));
        }

        if let Some(c) = s
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
        {
            return Err(invalid(&format!("contains invalid character '{}'", c)));
        }

        Ok(())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

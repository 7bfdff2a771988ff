//! Repository configuration.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::query::Pagination;

/// Settings for a [`CatalogRepository`](crate::CatalogRepository).
///
/// Passed in at construction; the repository never reads the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepositoryConfig {
    /// Page size for listings that do not ask for one.
    pub default_page_size: u32,

    /// Largest page size a listing may ask for.
    pub max_page_size: u32,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: Pagination::DEFAULT_LIMIT,
            max_page_size: 100,
        }
    }
}

impl RepositoryConfig {
    /// Check that the default page size is usable under the maximum.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ValidationError::InvalidLimit {
                limit: self.default_page_size,
                max: self.max_page_size,
            });
        }
        Ok(())
    }
}

//! Listing filters, pagination and pages.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::CatalogRecord;
use crate::types::{Cursor, Kind};

/// Which records a listing should return. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,

    /// Inclusive lower year bound. Records without a year never match a
    /// year bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_from: Option<i32>,

    /// Inclusive upper year bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_to: Option<i32>,

    /// Case-insensitive substring of the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_contains: Option<String>,
}

impl ListFilter {
    pub fn kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn years(mut self, from: Option<i32>, to: Option<i32>) -> Self {
        self.year_from = from;
        self.year_to = to;
        self
    }

    pub fn title_contains(mut self, needle: impl Into<String>) -> Self {
        self.title_contains = Some(needle.into());
        self
    }

    /// Returns true if `record` passes every set criterion.
    pub fn matches(&self, record: &CatalogRecord) -> bool {
        if self.kind.is_some_and(|kind| kind != record.kind) {
            return false;
        }

        if self.year_from.is_some() || self.year_to.is_some() {
            let Some(year) = record.year else {
                return false;
            };
            if self.year_from.is_some_and(|from| year < from) {
                return false;
            }
            if self.year_to.is_some_and(|to| year > to) {
                return false;
            }
        }

        match &self.title_contains {
            Some(needle) => record
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

/// Where a listing page starts and how long it is.
///
/// A page starts either after a [`Cursor`] or at an `offset` into the
/// filtered order, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Pagination {
    /// Page size used when none is given.
    pub const DEFAULT_LIMIT: u32 = 20;

    pub fn first(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn after(cursor: Cursor, limit: u32) -> Self {
        Self {
            cursor: Some(cursor),
            offset: None,
            limit: Some(limit),
        }
    }

    pub fn at_offset(offset: usize, limit: u32) -> Self {
        Self {
            cursor: None,
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    pub fn limit_or_default(&self) -> u32 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub records: Vec<CatalogRecord>,

    /// Resumes after the last record; `None` on the last page.
    pub next_cursor: Option<Cursor>,
}

/// The listing order: `created_at` descending, then `id` ascending.
pub fn listing_order(a: &CatalogRecord, b: &CatalogRecord) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Filter, order and cut one page out of a full record set.
///
/// Backends without native ordering (the in-memory map, the document
/// directory) share this so their listings agree exactly.
pub fn paginate<I>(records: I, filter: &ListFilter, pagination: &Pagination) -> ListPage
where
    I: IntoIterator<Item = CatalogRecord>,
{
    let mut matching: Vec<CatalogRecord> = records
        .into_iter()
        .filter(|r| filter.matches(r))
        .filter(|r| pagination.cursor.as_ref().is_none_or(|c| c.admits(r)))
        .collect();
    matching.sort_by(listing_order);

    let limit = pagination.limit_or_default() as usize;
    let mut page: Vec<CatalogRecord> = matching
        .into_iter()
        .skip(pagination.offset.unwrap_or(0))
        .take(limit + 1)
        .collect();

    let next_cursor = if page.len() > limit {
        page.truncate(limit);
        page.last().map(Cursor::after)
    } else {
        None
    };

    ListPage {
        records: page,
        next_cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordDraft;
    use crate::types::RecordId;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, secs: i64, title: &str, kind: Kind, year: Option<i32>) -> CatalogRecord {
        CatalogRecord::new(
            RecordId::new(id).unwrap(),
            RecordDraft {
                title: title.to_string(),
                description: None,
                kind,
                year,
            },
            Utc.timestamp_opt(secs, 0).unwrap(),
        )
    }

    fn sample() -> Vec<CatalogRecord> {
        vec![
            record("a", 1, "Dune", Kind::Movie, Some(2021)),
            record("b", 2, "Dune: Prophecy", Kind::Series, Some(2024)),
            record("c", 3, "Arrival", Kind::Movie, Some(2016)),
            record("d", 3, "Severance", Kind::Series, None),
        ]
    }

    fn ids(page: &ListPage) -> Vec<&str> {
        page.records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn orders_newest_first_with_id_tiebreak() {
        let page = paginate(sample(), &ListFilter::default(), &Pagination::default());
        assert_eq!(ids(&page), ["c", "d", "b", "a"]);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn filters_combine() {
        let filter = ListFilter::default().title_contains("dUNE");
        assert_eq!(ids(&paginate(sample(), &filter, &Pagination::default())), ["b", "a"]);

        let filter = ListFilter::default().kind(Kind::Series);
        assert_eq!(ids(&paginate(sample(), &filter, &Pagination::default())), ["d", "b"]);

        let filter = ListFilter::default().years(Some(2016), Some(2021));
        assert_eq!(ids(&paginate(sample(), &filter, &Pagination::default())), ["c", "a"]);
    }

    #[test]
    fn year_bound_excludes_records_without_year() {
        let filter = ListFilter::default().years(None, Some(3000));
        let page = paginate(sample(), &filter, &Pagination::default());
        assert!(!ids(&page).contains(&"d"));
    }

    #[test]
    fn cursor_pages_cover_everything_once() {
        let first = paginate(sample(), &ListFilter::default(), &Pagination::first(3));
        assert_eq!(ids(&first), ["c", "d", "b"]);
        let cursor = first.next_cursor.clone().unwrap();

        let second = paginate(sample(), &ListFilter::default(), &Pagination::after(cursor, 3));
        assert_eq!(ids(&second), ["a"]);
        assert!(second.next_cursor.is_none());
    }

    #[test]
    fn exact_fit_has_no_next_cursor() {
        let page = paginate(sample(), &ListFilter::default(), &Pagination::first(4));
        assert_eq!(page.records.len(), 4);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn offset_skips_into_order() {
        let page = paginate(sample(), &ListFilter::default(), &Pagination::at_offset(1, 2));
        assert_eq!(ids(&page), ["d", "b"]);
        assert!(page.next_cursor.is_some());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page size used when a filter does not specify one.
pub const DEFAULT_QUERY_LIMIT: u16 = 20;

/// Largest page size a filter may request.
pub const MAX_QUERY_LIMIT: u16 = 250;

/// Sort direction applied to the id column of list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Returns the SQL keyword.
    #[must_use]
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Pagination and time-bound filter for list queries.
///
/// Absent filters behave exactly like `QueryFilter::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// One-based page number.
    pub page: u64,
    /// Requested page size.
    pub limit: u16,
    /// Rows created strictly after this instant.
    pub created_after: Option<DateTime<Utc>>,
    /// Rows created strictly before this instant.
    pub created_before: Option<DateTime<Utc>>,
    /// Rows updated strictly after this instant.
    pub updated_after: Option<DateTime<Utc>>,
    /// Rows updated strictly before this instant.
    pub updated_before: Option<DateTime<Utc>>,
    /// Id ordering.
    pub sort_by: SortDirection,
    /// Admin-only: include archived rows.
    pub include_archived: bool,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_QUERY_LIMIT,
            created_after: None,
            created_before: None,
            updated_after: None,
            updated_before: None,
            sort_by: SortDirection::Asc,
            include_archived: false,
        }
    }
}

impl QueryFilter {
    /// Creates a filter for one page.
    #[must_use]
    pub fn page(page: u64, limit: u16) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    /// Returns the page clamped to at least one.
    #[must_use]
    pub fn effective_page(&self) -> u64 {
        self.page.max(1)
    }

    /// Returns the limit with zero replaced by the default and large values capped.
    #[must_use]
    pub fn effective_limit(&self) -> u16 {
        match self.limit {
            0 => DEFAULT_QUERY_LIMIT,
            limit => limit.min(MAX_QUERY_LIMIT),
        }
    }

    /// Returns `(page - 1) * limit` using the effective values.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.effective_page() - 1).saturating_mul(u64::from(self.effective_limit()))
    }

    /// Returns true when any time bound is present.
    #[must_use]
    pub fn has_time_bounds(&self) -> bool {
        self.created_after.is_some()
            || self.created_before.is_some()
            || self.updated_after.is_some()
            || self.updated_before.is_some()
    }
}

/// Counts attached to one page of a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Page that was served.
    pub page: u64,
    /// Page size that was applied.
    pub limit: u16,
    /// Rows matching the filter across all pages.
    pub filtered_count: u64,
    /// Rows in scope regardless of time bounds.
    pub total_count: u64,
}

impl Pagination {
    /// Creates an empty pagination block for a filter.
    #[must_use]
    pub fn for_filter(filter: &QueryFilter) -> Self {
        Self {
            page: filter.effective_page(),
            limit: filter.effective_limit(),
            filtered_count: 0,
            total_count: 0,
        }
    }
}

/// One page of entities plus its counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Page counts.
    pub pagination: Pagination,
}

impl<T> ListPage<T> {
    /// Creates an empty page for a filter.
    #[must_use]
    pub fn empty(filter: &QueryFilter) -> Self {
        Self {
            data: Vec::new(),
            pagination: Pagination::for_filter(filter),
        }
    }

    /// Returns the number of rows on this page.
    #[must_use]
    pub fn returned_count(&self) -> usize {
        self.data.len()
    }
}

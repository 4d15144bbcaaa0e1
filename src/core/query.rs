//! List query descriptor and its transport shape

use crate::core::error::QueryError;
use crate::core::filter::{FilterClause, RawFilter};
use crate::core::sort::SortClause;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Query parameters for includes, filtering, sorting and pagination
///
/// This is the flat, transport-neutral shape a request layer deserializes.
/// All parameters have sensible defaults.
///
/// # Example
/// ```json
/// {
///   "includes": ["Category"],
///   "filters": [{"field": "discontinued", "operator": "Eq", "value": true}],
///   "sorts": ["-price", "name"],
///   "page": 2,
///   "pageSize": 10
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQueryParams {
    /// Include tokens. Absent means the entity's default includes.
    #[serde(default)]
    pub includes: Option<Vec<String>>,

    #[serde(default)]
    pub filters: Vec<RawFilter>,

    /// Sort tokens (`name`, `-name`, `name:desc`)
    #[serde(default)]
    pub sorts: Vec<String>,

    /// Page number (starts at 1)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Number of items per page
    #[serde(default = "default_page_size", alias = "page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for ListQueryParams {
    fn default() -> Self {
        Self {
            includes: None,
            filters: Vec::new(),
            sorts: Vec::new(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQueryParams {
    /// Convert to a descriptor, reporting every malformed filter or sort
    pub fn into_query(self) -> Result<ListQuery, Vec<QueryError>> {
        let mut errors = Vec::new();

        let mut filters = Vec::with_capacity(self.filters.len());
        for raw in self.filters {
            match FilterClause::try_from(raw) {
                Ok(clause) => filters.push(clause),
                Err(e) => errors.push(e),
            }
        }

        let mut sorts = Vec::with_capacity(self.sorts.len());
        for token in &self.sorts {
            match SortClause::parse(token) {
                Ok(clause) => sorts.push(clause),
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ListQuery {
            includes: self.includes.map(|tokens| tokens.into_iter().collect()),
            filters,
            sorts,
            page: self.page,
            page_size: self.page_size,
        })
    }
}

impl TryFrom<ListQueryParams> for ListQuery {
    type Error = Vec<QueryError>;

    fn try_from(params: ListQueryParams) -> Result<Self, Self::Error> {
        params.into_query()
    }
}

/// The declarative list request: what to include, how to filter, sort and page.
///
/// Immutable once built; the `with_*` methods consume and return a new value.
/// Page bounds are not checked here, see `QueryValidator`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListQuery {
    includes: Option<IndexSet<String>>,
    filters: Vec<FilterClause>,
    sorts: Vec<SortClause>,
    page: i64,
    page_size: i64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            includes: None,
            filters: Vec::new(),
            sorts: Vec::new(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the include set (duplicates are dropped, order kept)
    pub fn with_includes<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes = Some(tokens.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_filter(mut self, clause: FilterClause) -> Self {
        self.filters.push(clause);
        self
    }

    pub fn with_sort(mut self, clause: SortClause) -> Self {
        self.sorts.push(clause);
        self
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Explicit include tokens; `None` selects the entity's defaults
    pub fn includes(&self) -> Option<&IndexSet<String>> {
        self.includes.as_ref()
    }

    pub fn filters(&self) -> &[FilterClause] {
        &self.filters
    }

    pub fn sorts(&self) -> &[SortClause] {
        &self.sorts
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }
}

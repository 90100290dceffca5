//! Pagination utilities for service layer
//!
//! Parses `sortBy` expressions (`field:asc|desc`, comma-separated), normalizes
//! page/limit against the configured policy and shapes the page result.

use configs::PaginationConfig;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Columns a list query may sort on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Name,
    Rating,
    ReviewCount,
    City,
    State,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub const ALL: [SortField; 7] = [
        SortField::Name,
        SortField::Rating,
        SortField::ReviewCount,
        SortField::City,
        SortField::State,
        SortField::CreatedAt,
        SortField::UpdatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Rating => "rating",
            SortField::ReviewCount => "reviewCount",
            SortField::City => "city",
            SortField::State => "state",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub order: SortOrder,
}

/// Parse `rating:desc,name` style expressions. A missing order means ascending.
pub fn parse_sort_by(expr: &str) -> Result<Vec<SortKey>, String> {
    expr.split(',')
        .map(|part| {
            let part = part.trim();
            let (field, order) = match part.split_once(':') {
                Some((f, o)) => (f.trim(), o.trim()),
                None => (part, "asc"),
            };
            if field.is_empty() {
                return Err("sort field missing".to_string());
            }
            let field = SortField::parse(field).ok_or_else(|| format!("cannot sort by '{field}'"))?;
            let order = match order {
                "asc" => SortOrder::Asc,
                "desc" => SortOrder::Desc,
                other => return Err(format!("sort order must be asc or desc, got '{other}'")),
            };
            Ok(SortKey { field, order })
        })
        .collect()
}

/// Raw list options as received from the caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryOptions {
    pub sort_by: Vec<SortKey>,
    pub limit: Option<u64>,
    pub page: Option<u64>,
}

/// Normalized page request.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub limit: u64,
    pub sort: Vec<SortKey>,
}

impl Page {
    /// 0-based index for `fetch_page`
    pub fn index(&self) -> u64 { self.page.saturating_sub(1) }

    pub fn offset(&self) -> u64 { self.index().saturating_mul(self.limit) }
}

/// Largest row offset a store query can express (a signed 64-bit OFFSET).
const MAX_OFFSET: u64 = i64::MAX as u64;

impl QueryOptions {
    /// Clamp to the configured policy; an empty sort becomes `createdAt:asc`.
    /// Pages past the last addressable offset are pinned to it.
    pub fn normalize(&self, cfg: &PaginationConfig) -> Page {
        let limit = self
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(cfg.default_limit)
            .clamp(1, cfg.max_limit.max(1));
        let last_page = MAX_OFFSET / limit + 1;
        let page = match self.page { Some(0) | None => 1, Some(p) => p.min(last_page) };
        let sort = if self.sort_by.is_empty() {
            vec![SortKey { field: SortField::CreatedAt, order: SortOrder::Asc }]
        } else {
            self.sort_by.clone()
        };
        Page { page, limit, sort }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    pub results: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub total_results: u64,
}

impl<T> QueryResult<T> {
    pub fn new(results: Vec<T>, page: &Page, total_results: u64) -> Self {
        Self {
            results,
            page: page.page,
            limit: page.limit,
            total_pages: total_results.div_ceil(page.limit),
            total_results,
        }
    }
}

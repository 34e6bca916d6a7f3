//! Pagination request

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::ModelMeta;
use crate::query::{Query, Selector};

use super::paginator::PaginatorOptions;

/// Rewrites the order-stripped query before it is counted
pub type CountQueryCallback = Arc<dyn Fn(Query) -> Query + Send + Sync>;

/// Page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum PerPage {
    Limit(u64),
    /// Every row on one page
    Unlimited,
}

impl PerPage {
    /// Raw page size that requests every row
    pub const UNLIMITED: i64 = -1;

    /// `-1` is unlimited, other non-positive sizes are invalid
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            Self::UNLIMITED => Some(PerPage::Unlimited),
            n if n > 0 => Some(PerPage::Limit(n as u64)),
            _ => None,
        }
    }

    /// Row limit, `None` when unlimited
    pub fn limit(&self) -> Option<u64> {
        match self {
            PerPage::Limit(n) => Some(*n),
            PerPage::Unlimited => None,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, PerPage::Unlimited)
    }
}

impl TryFrom<i64> for PerPage {
    type Error = String;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        PerPage::from_raw(raw).ok_or_else(|| format!("invalid page size {}", raw))
    }
}

impl From<PerPage> for i64 {
    fn from(per_page: PerPage) -> Self {
        match per_page {
            PerPage::Limit(n) => i64::try_from(n).unwrap_or(i64::MAX),
            PerPage::Unlimited => PerPage::UNLIMITED,
        }
    }
}

impl fmt::Display for PerPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerPage::Limit(n) => write!(f, "{}", n),
            PerPage::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Caller-supplied pagination parameters. Unset fields take defaults when resolved.
#[derive(Clone, Default)]
pub struct PaginationRequest {
    pub per_page: Option<PerPage>,
    /// Projection used when the query has none of its own
    pub columns: Vec<Selector>,
    pub page_name: Option<String>,
    pub page: Option<u64>,
    pub count_query: Option<CountQueryCallback>,
}

impl PaginationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn per_page(mut self, per_page: PerPage) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_name(mut self, page_name: impl Into<String>) -> Self {
        self.page_name = Some(page_name.into());
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn count_query(mut self, callback: impl Fn(Query) -> Query + Send + Sync + 'static) -> Self {
        self.count_query = Some(Arc::new(callback));
        self
    }

    /// Fills unset fields. Pages below 1 resolve to 1.
    pub fn resolve(
        &self,
        meta: &ModelMeta,
        default_page_name: &str,
        current_page: impl FnOnce(&str) -> u64,
    ) -> ResolvedRequest {
        let per_page = self.per_page.unwrap_or(PerPage::Limit(meta.per_page.max(1)));
        let page_name = self
            .page_name
            .clone()
            .unwrap_or_else(|| default_page_name.to_string());
        let page = self.page.unwrap_or_else(|| current_page(&page_name)).max(1);

        ResolvedRequest {
            window: PageWindow { per_page, page },
            page_name,
            columns: self.columns.clone(),
            count_query: self.count_query.clone(),
        }
    }
}

impl fmt::Debug for PaginationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationRequest")
            .field("per_page", &self.per_page)
            .field("columns", &self.columns)
            .field("page_name", &self.page_name)
            .field("page", &self.page)
            .field("count_query", &self.count_query.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

/// One page position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub per_page: PerPage,
    /// 1-based
    pub page: u64,
}

impl PageWindow {
    pub fn new(per_page: PerPage, page: u64) -> Self {
        Self {
            per_page,
            page: page.max(1),
        }
    }

    /// Rows skipped before this page
    pub fn offset(&self) -> u64 {
        match self.per_page {
            PerPage::Limit(n) => (self.page - 1).saturating_mul(n),
            PerPage::Unlimited => 0,
        }
    }

    /// Applies this window's LIMIT / OFFSET to `query`
    pub fn apply(&self, query: Query) -> Query {
        match self.per_page {
            PerPage::Limit(n) => query.for_page(self.page, n),
            PerPage::Unlimited => {
                let mut query = query;
                query.limit = None;
                query.offset = None;
                query
            }
        }
    }
}

/// A request with every default filled in
#[derive(Clone)]
pub struct ResolvedRequest {
    pub window: PageWindow,
    pub page_name: String,
    pub columns: Vec<Selector>,
    pub count_query: Option<CountQueryCallback>,
}

impl ResolvedRequest {
    pub fn options(&self) -> PaginatorOptions {
        PaginatorOptions::new(self.page_name.clone())
    }
}

impl fmt::Debug for ResolvedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRequest")
            .field("window", &self.window)
            .field("page_name", &self.page_name)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

//! Pagination results
//!
//! Both paginators serialize in the conventional
//! `{"data": [..], "current_page": .., "per_page": .., ..}` shape.

use serde::{Deserialize, Serialize};

use super::request::PerPage;

/// Presentation options carried through to the result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatorOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub page_name: String,
}

impl PaginatorOptions {
    pub fn new(page_name: impl Into<String>) -> Self {
        Self {
            path: None,
            page_name: page_name.into(),
        }
    }
}

/// Index of the first item on `page`, 1-based
fn first_item_index(per_page: PerPage, page: u64, len: usize) -> Option<u64> {
    if len == 0 {
        return None;
    }
    let offset = match per_page {
        PerPage::Limit(n) => page.saturating_sub(1).saturating_mul(n),
        PerPage::Unlimited => 0,
    };
    Some(offset + 1)
}

/// Page of items with a total row count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthAwarePaginator<T> {
    #[serde(rename = "data")]
    pub items: Vec<T>,
    pub total: u64,
    pub per_page: PerPage,
    pub current_page: u64,
    pub last_page: u64,
    #[serde(flatten)]
    pub options: PaginatorOptions,
}

impl<T> LengthAwarePaginator<T> {
    pub fn new(
        items: Vec<T>,
        total: u64,
        per_page: PerPage,
        current_page: u64,
        options: PaginatorOptions,
    ) -> Self {
        let last_page = match per_page {
            PerPage::Limit(n) if n > 0 => total.div_ceil(n).max(1),
            _ => 1,
        };
        Self {
            items,
            total,
            per_page,
            current_page: current_page.max(1),
            last_page,
            options,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }

    /// 1-based index of the first item on this page
    pub fn first_item(&self) -> Option<u64> {
        first_item_index(self.per_page, self.current_page, self.items.len())
    }

    /// 1-based index of the last item on this page
    pub fn last_item(&self) -> Option<u64> {
        self.first_item()
            .map(|first| first + self.items.len() as u64 - 1)
    }

    /// Replaces the items, keeping the statistics
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> LengthAwarePaginator<U> {
        LengthAwarePaginator {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            per_page: self.per_page,
            current_page: self.current_page,
            last_page: self.last_page,
            options: self.options,
        }
    }
}

/// Page of items with only a has-more flag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplePaginator<T> {
    #[serde(rename = "data")]
    pub items: Vec<T>,
    pub per_page: PerPage,
    pub current_page: u64,
    #[serde(rename = "has_more_pages")]
    pub has_more: bool,
    #[serde(flatten)]
    pub options: PaginatorOptions,
}

impl<T> SimplePaginator<T> {
    pub fn new(
        items: Vec<T>,
        per_page: PerPage,
        current_page: u64,
        has_more: bool,
        options: PaginatorOptions,
    ) -> Self {
        Self {
            items,
            per_page,
            current_page: current_page.max(1),
            has_more,
            options,
        }
    }

    /// Builds from a fetch of `per_page + 1` rows; the extra row only signals more pages
    pub fn from_overfetch(
        mut items: Vec<T>,
        per_page: PerPage,
        current_page: u64,
        options: PaginatorOptions,
    ) -> Self {
        let has_more = match per_page.limit() {
            Some(n) if items.len() as u64 > n => {
                items.truncate(n as usize);
                true
            }
            _ => false,
        };
        Self::new(items, per_page, current_page, has_more, options)
    }

    /// Overrides the has-more flag
    pub fn has_more_pages_when(mut self, has_more: bool) -> Self {
        self.has_more = has_more;
        self
    }

    pub fn has_more_pages(&self) -> bool {
        self.has_more
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn first_item(&self) -> Option<u64> {
        first_item_index(self.per_page, self.current_page, self.items.len())
    }

    pub fn last_item(&self) -> Option<u64> {
        self.first_item()
            .map(|first| first + self.items.len() as u64 - 1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SimplePaginator<U> {
        SimplePaginator {
            items: self.items.into_iter().map(f).collect(),
            per_page: self.per_page,
            current_page: self.current_page,
            has_more: self.has_more,
            options: self.options,
        }
    }
}

/// Result of a paginator selected at runtime
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Paginated<T> {
    LengthAware(LengthAwarePaginator<T>),
    Simple(SimplePaginator<T>),
}

impl<T> Paginated<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Paginated::LengthAware(p) => p.items(),
            Paginated::Simple(p) => p.items(),
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Paginated::LengthAware(p) => p.into_items(),
            Paginated::Simple(p) => p.into_items(),
        }
    }

    pub fn has_more_pages(&self) -> bool {
        match self {
            Paginated::LengthAware(p) => p.has_more_pages(),
            Paginated::Simple(p) => p.has_more_pages(),
        }
    }

    /// Total row count; simple paginators do not know it
    pub fn total(&self) -> Option<u64> {
        match self {
            Paginated::LengthAware(p) => Some(p.total),
            Paginated::Simple(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        match self {
            Paginated::LengthAware(p) => Paginated::LengthAware(p.map(f)),
            Paginated::Simple(p) => Paginated::Simple(p.map(f)),
        }
    }
}

impl<T> From<LengthAwarePaginator<T>> for Paginated<T> {
    fn from(paginator: LengthAwarePaginator<T>) -> Self {
        Paginated::LengthAware(paginator)
    }
}

impl<T> From<SimplePaginator<T>> for Paginated<T> {
    fn from(paginator: SimplePaginator<T>) -> Self {
        Paginated::Simple(paginator)
    }
}

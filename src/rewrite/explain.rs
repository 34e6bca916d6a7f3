//! Rewrite explain
//!
//! Dry run of the rewrite: which statements would be issued for one page, or why
//! the query would fall back. Nothing is executed.

use std::fmt;

use serde::Serialize;

use crate::config::PaginationConfig;
use crate::model::ModelMeta;
use crate::pagination::{CountQueryCallback, PageWindow, PaginationMode};
use crate::query::{CompiledQuery, Grammar, Query};

use super::guard::plan_rewrite;
use super::pager::inner_query;

/// Statements the rewrite would issue for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewriteExplain {
    pub mode: PaginationMode,
    pub rewritten: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    /// Key query selects `DISTINCT key` instead of grouping
    pub distinct: bool,
    /// Count statement (length-aware mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<CompiledQuery>,
    /// Key-only page query, or the unmodified page query on fallback
    pub page: CompiledQuery,
    /// Row fetch, with the key list elided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer: Option<CompiledQuery>,
}

impl RewriteExplain {
    /// Explains one page of `query`; `count_query` is applied to the count
    /// statement as the length-aware fetch applies it.
    pub fn build(
        query: &Query,
        meta: &ModelMeta,
        grammar: &dyn Grammar,
        window: PageWindow,
        mode: PaginationMode,
        count_query: Option<&CountQueryCallback>,
        config: &PaginationConfig,
    ) -> Self {
        if window.per_page.is_unlimited() {
            return Self::unmodified(
                query,
                grammar,
                window,
                mode,
                count_query,
                None,
                "unlimited page size".into(),
            );
        }

        let plan = match plan_rewrite(query, meta, grammar, config) {
            Ok(plan) => plan,
            Err(incompatibility) => {
                return Self::unmodified(
                    query,
                    grammar,
                    window,
                    mode,
                    count_query,
                    Some(incompatibility.code().code().to_string()),
                    incompatibility.message().to_string(),
                );
            }
        };

        let inner = inner_query(query, &plan);
        let count = match mode {
            PaginationMode::LengthAware => {
                let counted = counted(inner.clone().without_paging(), count_query);
                Some(grammar.compile_count_subquery(&counted))
            }
            PaginationMode::Simple => None,
        };

        let membership = format!("{} in (...)", grammar.wrap(&meta.qualified_key()));
        let outer = page_query(
            query.clone().where_raw(membership, vec![]),
            PageWindow::new(window.per_page, 1),
            PaginationMode::Simple,
        );

        Self {
            mode,
            rewritten: true,
            fallback_code: None,
            fallback_reason: None,
            distinct: plan.replaces_group_by,
            count,
            page: grammar.compile_select(&page_query(inner, window, mode)),
            outer: Some(grammar.compile_select(&outer)),
        }
    }

    fn unmodified(
        query: &Query,
        grammar: &dyn Grammar,
        window: PageWindow,
        mode: PaginationMode,
        count_query: Option<&CountQueryCallback>,
        code: Option<String>,
        reason: String,
    ) -> Self {
        let count = match mode {
            PaginationMode::LengthAware => {
                let stripped = counted(query.clone().without_paging(), count_query);
                Some(if stripped.needs_subquery_count() {
                    grammar.compile_count_subquery(&stripped)
                } else {
                    grammar.compile_count(&stripped)
                })
            }
            PaginationMode::Simple => None,
        };

        Self {
            mode,
            rewritten: false,
            fallback_code: code,
            fallback_reason: Some(reason),
            distinct: false,
            count,
            page: grammar.compile_select(&page_query(query.clone(), window, mode)),
            outer: None,
        }
    }
}

fn counted(query: Query, count_query: Option<&CountQueryCallback>) -> Query {
    match count_query {
        Some(callback) => callback(query),
        None => query,
    }
}

/// LIMIT / OFFSET as the strategy for `mode` would apply them
fn page_query(query: Query, window: PageWindow, mode: PaginationMode) -> Query {
    match (mode, window.per_page.limit()) {
        (PaginationMode::Simple, Some(n)) => query.offset(window.offset()).limit(n + 1),
        _ => window.apply(query),
    }
}

impl fmt::Display for RewriteExplain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== FAST PAGINATE EXPLAIN ===")?;
        writeln!(f, "Mode: {}", self.mode.as_str())?;

        if self.rewritten {
            writeln!(f, "Status: REWRITTEN")?;
            writeln!(f, "Distinct: {}", self.distinct)?;
        } else {
            writeln!(f, "Status: FALLBACK")?;
            if let Some(code) = &self.fallback_code {
                writeln!(f, "Code: {}", code)?;
            }
            if let Some(reason) = &self.fallback_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        if let Some(count) = &self.count {
            writeln!(f, "Count: {}", count)?;
        }
        writeln!(f, "Page: {}", self.page)?;
        if let Some(outer) = &self.outer {
            writeln!(f, "Rows: {}", outer)?;
        }
        Ok(())
    }
}

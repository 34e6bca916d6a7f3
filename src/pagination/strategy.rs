//! Pagination strategies
//!
//! One strategy value per pagination mode. A strategy knows how to fetch one page
//! of rows together with its statistics, and how to build the final result from
//! hydrated items plus those statistics. The rewrite reuses both halves: the
//! statistics come from the key-only query, the items from the row fetch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::{Connection, DatabaseError, DbResult, Row};
use crate::query::Query;

use super::paginator::{LengthAwarePaginator, PaginatorOptions, SimplePaginator};
use super::request::{CountQueryCallback, PageWindow, PerPage};

/// Pagination mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    /// Total count + page rows
    LengthAware,
    /// Page rows + has-more flag
    Simple,
}

impl PaginationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaginationMode::LengthAware => "length_aware",
            PaginationMode::Simple => "simple",
        }
    }
}

/// How a length-aware fetch counts rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountStrategy {
    /// Subquery count only when grouping, HAVING or UNION require it
    #[default]
    Auto,
    /// Always `select count(*) from (<query>)`
    Subquery,
}

/// Statistics of a length-aware page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthAwareStats {
    pub total: u64,
    pub window: PageWindow,
}

/// Statistics of a simple page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleStats {
    pub has_more: bool,
    pub window: PageWindow,
}

/// A pagination mode: page fetch + result construction
pub trait PaginationStrategy {
    type Stats: Copy + std::fmt::Debug;
    type Output<T>;

    const MODE: PaginationMode;

    /// Executes one page of `query` at `window`
    fn fetch_page(
        conn: &mut dyn Connection,
        query: &Query,
        window: PageWindow,
        count: CountStrategy,
        count_query: Option<&CountQueryCallback>,
    ) -> DbResult<(Vec<Row>, Self::Stats)>;

    /// Builds the result from items and page statistics
    fn build<T>(items: Vec<T>, stats: Self::Stats, options: PaginatorOptions) -> Self::Output<T>;
}

/// Length-aware pagination
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthAware;

/// Simple pagination
#[derive(Debug, Clone, Copy, Default)]
pub struct Simple;

impl PaginationStrategy for LengthAware {
    type Stats = LengthAwareStats;
    type Output<T> = LengthAwarePaginator<T>;

    const MODE: PaginationMode = PaginationMode::LengthAware;

    fn fetch_page(
        conn: &mut dyn Connection,
        query: &Query,
        window: PageWindow,
        count: CountStrategy,
        count_query: Option<&CountQueryCallback>,
    ) -> DbResult<(Vec<Row>, Self::Stats)> {
        let mut counted = query.clone().without_paging();
        if let Some(callback) = count_query {
            counted = callback(counted);
        }
        let total = count_rows(conn, &counted, count)?;

        let rows = if total > 0 {
            window.apply(query.clone()).get(conn)?
        } else {
            Vec::new()
        };

        Ok((rows, LengthAwareStats { total, window }))
    }

    fn build<T>(items: Vec<T>, stats: Self::Stats, options: PaginatorOptions) -> Self::Output<T> {
        LengthAwarePaginator::new(
            items,
            stats.total,
            stats.window.per_page,
            stats.window.page,
            options,
        )
    }
}

impl PaginationStrategy for Simple {
    type Stats = SimpleStats;
    type Output<T> = SimplePaginator<T>;

    const MODE: PaginationMode = PaginationMode::Simple;

    fn fetch_page(
        conn: &mut dyn Connection,
        query: &Query,
        window: PageWindow,
        _count: CountStrategy,
        _count_query: Option<&CountQueryCallback>,
    ) -> DbResult<(Vec<Row>, Self::Stats)> {
        let (mut rows, has_more) = match window.per_page {
            PerPage::Limit(n) => {
                let paged = query
                    .clone()
                    .offset(window.offset())
                    .limit(n.saturating_add(1));
                let rows = paged.get(conn)?;
                let has_more = rows.len() as u64 > n;
                (rows, has_more)
            }
            PerPage::Unlimited => (window.apply(query.clone()).get(conn)?, false),
        };

        if let Some(n) = window.per_page.limit() {
            rows.truncate(n as usize);
        }

        Ok((rows, SimpleStats { has_more, window }))
    }

    fn build<T>(items: Vec<T>, stats: Self::Stats, options: PaginatorOptions) -> Self::Output<T> {
        SimplePaginator::new(
            items,
            stats.window.per_page,
            stats.window.page,
            stats.has_more,
            options,
        )
    }
}

/// Runs the count query for `query` (already stripped of ordering and paging)
pub fn count_rows(conn: &mut dyn Connection, query: &Query, strategy: CountStrategy) -> DbResult<u64> {
    let grammar = conn.grammar();
    let compiled = match strategy {
        CountStrategy::Subquery => grammar.compile_count_subquery(query),
        CountStrategy::Auto if query.needs_subquery_count() => grammar.compile_count_subquery(query),
        CountStrategy::Auto => grammar.compile_count(query),
    };

    let rows = conn.select(&compiled)?;
    rows.first()
        .and_then(|row| row.get("aggregate"))
        .and_then(aggregate_value)
        .ok_or(DatabaseError::MissingAggregate)
}

/// Drivers may report counts as numbers or numeric strings
fn aggregate_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{CompiledQuery, Grammar, SqliteGrammar};
    use serde_json::json;

    /// Answers count queries with a fixed total and row queries with ids
    struct Scripted {
        total: Value,
        ids: Vec<i64>,
        seen: Vec<String>,
    }

    impl Connection for Scripted {
        fn grammar(&self) -> &dyn Grammar {
            &SqliteGrammar
        }

        fn select(&mut self, query: &CompiledQuery) -> DbResult<Vec<Row>> {
            self.seen.push(query.sql.clone());
            if query.sql.starts_with("select count(*)") {
                let mut row = Row::new();
                row.insert("aggregate".into(), self.total.clone());
                return Ok(vec![row]);
            }
            Ok(self
                .ids
                .iter()
                .map(|id| {
                    let mut row = Row::new();
                    row.insert("id".into(), json!(id));
                    row
                })
                .collect())
        }
    }

    fn scripted(total: Value, ids: Vec<i64>) -> Scripted {
        Scripted {
            total,
            ids,
            seen: Vec::new(),
        }
    }

    #[test]
    fn test_length_aware_counts_then_fetches() {
        let mut conn = scripted(json!(12), vec![6, 7, 8, 9, 10]);
        let window = PageWindow::new(PerPage::Limit(5), 2);
        let (rows, stats) = LengthAware::fetch_page(
            &mut conn,
            &Query::table("posts").order_by_desc("id"),
            window,
            CountStrategy::Auto,
            None,
        )
        .unwrap();

        assert_eq!(rows.len(), 5);
        assert_eq!(stats.total, 12);
        assert_eq!(
            conn.seen,
            vec![
                "select count(*) as aggregate from \"posts\"".to_string(),
                "select * from \"posts\" order by \"id\" desc limit 5 offset 5".to_string(),
            ]
        );
    }

    #[test]
    fn test_length_aware_skips_fetch_when_empty() {
        let mut conn = scripted(json!(0), vec![]);
        let (rows, stats) = LengthAware::fetch_page(
            &mut conn,
            &Query::table("posts"),
            PageWindow::new(PerPage::Limit(5), 1),
            CountStrategy::Auto,
            None,
        )
        .unwrap();
        assert!(rows.is_empty());
        assert_eq!(stats.total, 0);
        assert_eq!(conn.seen.len(), 1);
    }

    #[test]
    fn test_count_callback_and_subquery() {
        let mut conn = scripted(json!("3"), vec![1, 2, 3]);
        let callback: CountQueryCallback =
            std::sync::Arc::new(|q: Query| q.where_eq("published", json!(1)));
        let (_, stats) = LengthAware::fetch_page(
            &mut conn,
            &Query::table("posts").select(["posts.id"]),
            PageWindow::new(PerPage::Limit(5), 1),
            CountStrategy::Subquery,
            Some(&callback),
        )
        .unwrap();

        assert_eq!(stats.total, 3);
        assert_eq!(
            conn.seen[0],
            "select count(*) as aggregate from (select \"posts\".\"id\" from \"posts\" \
             where \"published\" = ?) as \"temp_table\""
        );
    }

    #[test]
    fn test_simple_overfetches_by_one() {
        let mut conn = scripted(json!(0), vec![1, 2, 3, 4]);
        let (rows, stats) = Simple::fetch_page(
            &mut conn,
            &Query::table("posts"),
            PageWindow::new(PerPage::Limit(3), 1),
            CountStrategy::Auto,
            None,
        )
        .unwrap();

        assert_eq!(rows.len(), 3);
        assert!(stats.has_more);
        assert_eq!(conn.seen, vec!["select * from \"posts\" limit 4".to_string()]);
    }

    #[test]
    fn test_missing_aggregate() {
        let mut conn = scripted(Value::Null, vec![]);
        let err = count_rows(&mut conn, &Query::table("posts"), CountStrategy::Auto).unwrap_err();
        assert!(matches!(err, DatabaseError::MissingAggregate));
    }

    #[test]
    fn test_build_results() {
        let window = PageWindow::new(PerPage::Limit(2), 3);
        let la = LengthAware::build(vec!["a", "b"], LengthAwareStats { total: 9, window }, PaginatorOptions::new("page"));
        assert_eq!(la.last_page, 5);
        assert_eq!(la.current_page, 3);

        let s = Simple::build(vec!["a"], SimpleStats { has_more: false, window }, PaginatorOptions::new("page"));
        assert!(!s.has_more_pages());
        assert_eq!(LengthAware::MODE, PaginationMode::LengthAware);
        assert_eq!(Simple::MODE.as_str(), "simple");
    }
}

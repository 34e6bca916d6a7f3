//! Key-extraction pager
//!
//! Runs the key-only query for one page. Lengths are always counted with a
//! subquery: DISTINCT or a dropped GROUP BY change what a direct `count(*)` over
//! the rewritten query would mean.

use serde_json::Value;

use crate::connection::{Connection, Row};
use crate::model::ModelMeta;
use crate::pagination::{
    CountStrategy, PaginationError, PaginationResult, PaginationStrategy, ResolvedRequest,
};
use crate::query::Query;

use super::planner::InnerPlan;

/// Primary keys of one page plus the page statistics
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPage<S> {
    /// Raw key values in inner query order
    pub keys: Vec<Value>,
    pub stats: S,
}

/// The key-only clone of `query`
pub fn inner_query(query: &Query, plan: &InnerPlan) -> Query {
    let inner = query.clone().select(plan.selectors.iter().cloned());
    if plan.replaces_group_by {
        inner.without_group_by()
    } else {
        inner
    }
}

/// Executes the key-only query for the requested page
pub fn fetch_key_page<S: PaginationStrategy>(
    conn: &mut dyn Connection,
    query: &Query,
    meta: &ModelMeta,
    plan: &InnerPlan,
    resolved: &ResolvedRequest,
) -> PaginationResult<KeyPage<S::Stats>> {
    let inner = inner_query(query, plan);
    let (rows, stats) = S::fetch_page(
        conn,
        &inner,
        resolved.window,
        CountStrategy::Subquery,
        resolved.count_query.as_ref(),
    )?;

    let keys = rows
        .iter()
        .map(|row| raw_key(row, meta))
        .collect::<PaginationResult<Vec<_>>>()?;

    Ok(KeyPage { keys, stats })
}

/// Key value exactly as the driver returned it
fn raw_key(row: &Row, meta: &ModelMeta) -> PaginationResult<Value> {
    row.get(&meta.key_name)
        .or_else(|| row.get(&meta.qualified_key()))
        .cloned()
        .ok_or_else(|| PaginationError::MissingKey(meta.key_name.clone()))
}

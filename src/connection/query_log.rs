//! Statement recording wrapper

use crate::observability::Logger;
use crate::query::{CompiledQuery, Grammar};

use super::errors::DbResult;
use super::{Connection, Row};

/// Wraps a connection and records every statement it executes, in order.
///
/// Each statement is also logged at TRACE as `QUERY_EXECUTED`.
pub struct QueryLog<C> {
    inner: C,
    queries: Vec<CompiledQuery>,
}

impl<C: Connection> QueryLog<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            queries: Vec::new(),
        }
    }

    /// Statements executed so far
    pub fn queries(&self) -> &[CompiledQuery] {
        &self.queries
    }

    /// Returns and clears the recorded statements
    pub fn take_queries(&mut self) -> Vec<CompiledQuery> {
        std::mem::take(&mut self.queries)
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Connection> Connection for QueryLog<C> {
    fn grammar(&self) -> &dyn Grammar {
        self.inner.grammar()
    }

    fn select(&mut self, query: &CompiledQuery) -> DbResult<Vec<Row>> {
        let bindings = query.bindings.len().to_string();
        Logger::trace(
            "QUERY_EXECUTED",
            &[("sql", query.sql.as_str()), ("bindings", bindings.as_str())],
        );
        self.queries.push(query.clone());
        self.inner.select(query)
    }
}

//! Query builder
//!
//! By-value builder over a single table. Compiling is delegated to a `Grammar`,
//! executing to a `Connection`.

use serde_json::Value;

use crate::connection::{Connection, DbResult, Row};

use super::ast::{
    Bindings, Direction, Having, Join, JoinKind, Operator, Order, Selector, Union, WhereClause,
};
use super::grammar::{CompiledQuery, Grammar};

/// A SELECT query under construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Source table
    pub table: String,
    /// Projection; empty selects `*`
    pub columns: Vec<Selector>,
    pub joins: Vec<Join>,
    pub wheres: Vec<WhereClause>,
    pub groups: Vec<Selector>,
    pub havings: Vec<Having>,
    pub orders: Vec<Order>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub unions: Vec<Union>,
    pub bindings: Bindings,
}

impl Query {
    /// Creates a query over the given table
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Replaces the projection. Select bindings are discarded with it.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self.bindings.select.clear();
        self
    }

    /// Appends a column to the projection
    pub fn add_select(mut self, column: impl Into<Selector>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Appends a raw expression (with its bindings) to the projection
    pub fn select_raw(mut self, sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        self.columns.push(Selector::raw(sql));
        self.bindings.select.extend(bindings);
        self
    }

    pub fn join(
        self,
        table: impl Into<String>,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.push_join(JoinKind::Inner, table, first, operator, second)
    }

    pub fn left_join(
        self,
        table: impl Into<String>,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.push_join(JoinKind::Left, table, first, operator, second)
    }

    fn push_join(
        mut self,
        kind: JoinKind,
        table: impl Into<String>,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.joins.push(Join {
            kind,
            table: table.into(),
            first: first.into(),
            operator,
            second: second.into(),
        });
        self
    }

    /// Adds `column op ?`
    pub fn where_op(mut self, column: impl Into<String>, operator: Operator, value: Value) -> Self {
        self.bindings.wheres.push(value.clone());
        self.wheres.push(WhereClause::Basic {
            column: column.into(),
            operator,
            value,
        });
        self
    }

    /// Adds `column = ?`
    pub fn where_eq(self, column: impl Into<String>, value: Value) -> Self {
        self.where_op(column, Operator::Eq, value)
    }

    /// Adds `column in (?, ...)` with bound values
    pub fn where_in(mut self, column: impl Into<String>, values: Vec<Value>) -> Self {
        self.bindings.wheres.extend(values.iter().cloned());
        self.wheres.push(WhereClause::In {
            column: column.into(),
            values,
        });
        self
    }

    /// Adds `column in (1, 2, ...)` with the integers inlined in the SQL text
    pub fn where_integer_in_raw(mut self, column: impl Into<String>, values: Vec<i64>) -> Self {
        self.wheres.push(WhereClause::InRaw {
            column: column.into(),
            values,
        });
        self
    }

    pub fn where_null(mut self, column: impl Into<String>) -> Self {
        self.wheres.push(WhereClause::Null {
            column: column.into(),
            negated: false,
        });
        self
    }

    pub fn where_not_null(mut self, column: impl Into<String>) -> Self {
        self.wheres.push(WhereClause::Null {
            column: column.into(),
            negated: true,
        });
        self
    }

    pub fn where_raw(mut self, sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        self.bindings.wheres.extend(bindings);
        self.wheres.push(WhereClause::Raw { sql: sql.into() });
        self
    }

    pub fn group_by(mut self, column: impl Into<Selector>) -> Self {
        self.groups.push(column.into());
        self
    }

    /// Drops every GROUP BY expression
    pub fn without_group_by(mut self) -> Self {
        self.groups.clear();
        self
    }

    pub fn having(mut self, column: impl Into<Selector>, operator: Operator, value: Value) -> Self {
        self.bindings.having.push(value.clone());
        self.havings.push(Having::Basic {
            column: column.into(),
            operator,
            value,
        });
        self
    }

    pub fn having_raw(mut self, sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        self.bindings.having.extend(bindings);
        self.havings.push(Having::Raw { sql: sql.into() });
        self
    }

    pub fn order_by(mut self, column: impl Into<Selector>, direction: Direction) -> Self {
        self.orders.push(Order::Column {
            column: column.into(),
            direction,
        });
        self
    }

    pub fn order_by_desc(self, column: impl Into<Selector>) -> Self {
        self.order_by(column, Direction::Desc)
    }

    pub fn order_by_raw(mut self, sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        self.bindings.order.extend(bindings);
        self.orders.push(Order::Raw { sql: sql.into() });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets limit and offset for a 1-based page number
    pub fn for_page(self, page: u64, per_page: u64) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        self.offset(offset).limit(per_page)
    }

    pub fn union(mut self, query: Query) -> Self {
        self.unions.push(Union {
            query: Box::new(query),
            all: false,
        });
        self
    }

    pub fn union_all(mut self, query: Query) -> Self {
        self.unions.push(Union {
            query: Box::new(query),
            all: true,
        });
        self
    }

    /// Uses `columns` as the projection only when none has been set
    pub fn with_default_columns(mut self, columns: &[Selector]) -> Self {
        if self.columns.is_empty() && !columns.is_empty() {
            self.columns = columns.to_vec();
        }
        self
    }

    /// Strips ordering and paging, keeping everything that determines the row set
    pub fn without_paging(mut self) -> Self {
        self.orders.clear();
        self.bindings.order.clear();
        self.limit = None;
        self.offset = None;
        self
    }

    /// True when counting must wrap the query instead of replacing its projection
    pub fn needs_subquery_count(&self) -> bool {
        !self.groups.is_empty() || !self.havings.is_empty() || !self.unions.is_empty()
    }

    /// Compiles the query with the given grammar
    pub fn to_sql(&self, grammar: &dyn Grammar) -> CompiledQuery {
        grammar.compile_select(self)
    }

    /// Compiles and executes the query
    pub fn get(&self, conn: &mut dyn Connection) -> DbResult<Vec<Row>> {
        let compiled = self.to_sql(conn.grammar());
        conn.select(&compiled)
    }
}

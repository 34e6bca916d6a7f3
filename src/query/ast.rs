//! Query clause structures
//!
//! Clauses keep their values out of the SQL text; bound values live in the
//! owning `Query`'s binding buckets.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::builder::Query;
use super::grammar::Grammar;

/// Raw SQL fragment used verbatim in place of a column reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expression {
    sql: String,
}

impl Expression {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    /// Textual value of the expression for the given grammar
    pub fn value(&self, _grammar: &dyn Grammar) -> String {
        self.sql.clone()
    }

    pub fn as_str(&self) -> &str {
        &self.sql
    }
}

/// A column reference: either a named column or a raw expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// Named column, optionally qualified (`posts.id`) or aliased (`title as t`)
    Column(String),
    /// Raw expression rendered verbatim
    Raw(Expression),
}

impl Selector {
    pub fn column(name: impl Into<String>) -> Self {
        Selector::Column(name.into())
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Selector::Raw(Expression::new(sql))
    }

    /// Renders the selector as it appears in compiled SQL.
    ///
    /// Named columns are wrapped by the grammar; raw expressions render as-is.
    pub fn render(&self, grammar: &dyn Grammar) -> String {
        match self {
            Selector::Column(name) => grammar.wrap(name),
            Selector::Raw(expr) => expr.value(grammar),
        }
    }

    /// Unquoted textual form
    pub fn text(&self, grammar: &dyn Grammar) -> String {
        match self {
            Selector::Column(name) => name.clone(),
            Selector::Raw(expr) => expr.value(grammar),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Selector::Raw(_))
    }

    /// Returns the column name for named columns
    pub fn as_column(&self) -> Option<&str> {
        match self {
            Selector::Column(name) => Some(name),
            Selector::Raw(_) => None,
        }
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Selector::Column(name.to_string())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Selector::Column(name)
    }
}

impl From<Expression> for Selector {
    fn from(expr: Expression) -> Self {
        Selector::Raw(expr)
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "like")]
    Like,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Like => "like",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// WHERE clause entries (combined with AND)
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    /// `column op ?`
    Basic {
        column: String,
        operator: Operator,
        value: Value,
    },
    /// `column in (?, ?, ...)`
    In { column: String, values: Vec<Value> },
    /// `column in (1, 2, ...)` with integers inlined instead of bound
    InRaw { column: String, values: Vec<i64> },
    /// `column is [not] null`
    Null { column: String, negated: bool },
    /// Raw SQL condition
    Raw { sql: String },
}

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "inner join",
            JoinKind::Left => "left join",
        }
    }
}

/// Join on a single column equality
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub first: String,
    pub operator: Operator,
    pub second: String,
}

/// HAVING clause entries (combined with AND)
#[derive(Debug, Clone, PartialEq)]
pub enum Having {
    /// `column op ?`
    Basic {
        column: Selector,
        operator: Operator,
        value: Value,
    },
    /// Raw SQL condition
    Raw { sql: String },
}

impl Having {
    /// Column referenced by the clause (raw conditions reference none)
    pub fn column(&self) -> Option<&Selector> {
        match self {
            Having::Basic { column, .. } => Some(column),
            Having::Raw { .. } => None,
        }
    }
}

/// ORDER BY entries
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    Column { column: Selector, direction: Direction },
    Raw { sql: String },
}

impl Order {
    /// Column referenced by the entry (raw orderings reference none)
    pub fn column(&self) -> Option<&Selector> {
        match self {
            Order::Column { column, .. } => Some(column),
            Order::Raw { .. } => None,
        }
    }
}

/// UNION member
#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub query: Box<Query>,
    pub all: bool,
}

/// Bound values per clause kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    pub select: Vec<Value>,
    pub wheres: Vec<Value>,
    pub having: Vec<Value>,
    pub order: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SqliteGrammar;

    #[test]
    fn test_selector_render() {
        let grammar = SqliteGrammar;
        assert_eq!(Selector::from("posts.id").render(&grammar), "\"posts\".\"id\"");
        assert_eq!(Selector::from("posts.id").text(&grammar), "posts.id");
        assert_eq!(
            Selector::raw("count(*) as total").render(&grammar),
            "count(*) as total"
        );
    }

    #[test]
    fn test_operator_serde() {
        let op: Operator = serde_json::from_str("\">=\"").unwrap();
        assert_eq!(op, Operator::Gte);
        assert_eq!(op.as_sql(), ">=");
    }

    #[test]
    fn test_raw_clauses_have_no_column() {
        assert!(Order::Raw { sql: "random()".into() }.column().is_none());
        assert!(Having::Raw { sql: "count(*) > 1".into() }.column().is_none());
    }
}

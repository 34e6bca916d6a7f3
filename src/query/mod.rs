//! Query builder subsystem
//!
//! A small relational query builder: clause structures, a by-value builder and
//! the dialect grammar that renders them. The pagination rewrite reads and clones
//! these queries; it never parses SQL text.

mod ast;
mod builder;
mod grammar;

pub use ast::{
    Bindings, Direction, Expression, Having, Join, JoinKind, Operator, Order, Selector, Union,
    WhereClause,
};
pub use builder::Query;
pub use grammar::{CompiledQuery, Grammar, MySqlGrammar, SqliteGrammar};

//! SQL grammar
//!
//! Dialect-specific rendering of identifiers and statements. Everything except
//! identifier quoting and limit rendering is shared.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::ast::{Having, Order, Selector, WhereClause};
use super::builder::Query;

/// Compiled SQL text plus its bindings in text order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub sql: String,
    pub bindings: Vec<Value>,
}

impl CompiledQuery {
    pub fn new(sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            bindings,
        }
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}

/// Splits `expr as alias` on a case-insensitive ` as `
fn split_alias(value: &str) -> Option<(&str, &str)> {
    let lowered = value.to_ascii_lowercase();
    let idx = lowered.find(" as ")?;
    Some((value[..idx].trim(), value[idx + 4..].trim()))
}

/// Dialect capability used to render column references and statements
pub trait Grammar: fmt::Debug + Send + Sync {
    /// Dialect name
    fn name(&self) -> &'static str;

    /// Identifier quote character
    fn quote(&self) -> char;

    /// Quotes a single identifier segment; `*` is left alone
    fn wrap_value(&self, value: &str) -> String {
        if value == "*" {
            return value.to_string();
        }
        let q = self.quote();
        let escaped = value.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }

    /// Quotes a possibly qualified and possibly aliased column reference
    fn wrap(&self, value: &str) -> String {
        if let Some((column, alias)) = split_alias(value) {
            return format!("{} as {}", self.wrap(column), self.wrap_value(alias));
        }
        value
            .split('.')
            .map(|segment| self.wrap_value(segment.trim()))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn wrap_table(&self, table: &str) -> String {
        self.wrap(table)
    }

    /// Comma separated placeholders
    fn parameterize(&self, count: usize) -> String {
        vec!["?"; count].join(", ")
    }

    /// LIMIT / OFFSET suffix (leading space included when non-empty)
    fn compile_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        let offset = offset.filter(|o| *o > 0);
        match (limit, offset) {
            (Some(limit), Some(offset)) => format!(" limit {} offset {}", limit, offset),
            (Some(limit), None) => format!(" limit {}", limit),
            (None, Some(offset)) => format!(" limit -1 offset {}", offset),
            (None, None) => String::new(),
        }
    }

    /// Full SELECT statement
    fn compile_select(&self, query: &Query) -> CompiledQuery {
        let mut compiled = self.compile_components(query);

        for union in &query.unions {
            let member = self.compile_components(&union.query);
            compiled
                .sql
                .push_str(if union.all { " union all " } else { " union " });
            compiled.sql.push_str(&member.sql);
            compiled.bindings.extend(member.bindings);
        }

        if !query.orders.is_empty() {
            let orders: Vec<String> = query
                .orders
                .iter()
                .map(|order| match order {
                    Order::Column { column, direction } => {
                        format!("{} {}", column.render(self.as_dyn()), direction.as_str())
                    }
                    Order::Raw { sql } => sql.clone(),
                })
                .collect();
            compiled.sql.push_str(" order by ");
            compiled.sql.push_str(&orders.join(", "));
            compiled.bindings.extend(query.bindings.order.iter().cloned());
        }

        compiled
            .sql
            .push_str(&self.compile_limit_offset(query.limit, query.offset));
        compiled
    }

    /// SELECT .. FROM .. JOIN .. WHERE .. GROUP BY .. HAVING (no ordering or paging)
    fn compile_components(&self, query: &Query) -> CompiledQuery {
        let grammar = self.as_dyn();
        let mut bindings = Vec::new();

        let columns = if query.columns.is_empty() {
            "*".to_string()
        } else {
            query
                .columns
                .iter()
                .map(|c| c.render(grammar))
                .collect::<Vec<_>>()
                .join(", ")
        };
        bindings.extend(query.bindings.select.iter().cloned());

        let mut sql = format!("select {} from {}", columns, self.wrap_table(&query.table));

        for join in &query.joins {
            sql.push_str(&format!(
                " {} {} on {} {} {}",
                join.kind.as_sql(),
                self.wrap_table(&join.table),
                self.wrap(&join.first),
                join.operator.as_sql(),
                self.wrap(&join.second)
            ));
        }

        if !query.wheres.is_empty() {
            let wheres: Vec<String> = query.wheres.iter().map(|w| self.compile_where(w)).collect();
            sql.push_str(" where ");
            sql.push_str(&wheres.join(" and "));
            bindings.extend(query.bindings.wheres.iter().cloned());
        }

        if !query.groups.is_empty() {
            let groups: Vec<String> = query.groups.iter().map(|g| g.render(grammar)).collect();
            sql.push_str(" group by ");
            sql.push_str(&groups.join(", "));
        }

        if !query.havings.is_empty() {
            let havings: Vec<String> = query
                .havings
                .iter()
                .map(|h| match h {
                    Having::Basic {
                        column, operator, ..
                    } => format!("{} {} ?", column.render(grammar), operator.as_sql()),
                    Having::Raw { sql } => sql.clone(),
                })
                .collect();
            sql.push_str(" having ");
            sql.push_str(&havings.join(" and "));
            bindings.extend(query.bindings.having.iter().cloned());
        }

        CompiledQuery::new(sql, bindings)
    }

    fn compile_where(&self, clause: &WhereClause) -> String {
        match clause {
            WhereClause::Basic {
                column, operator, ..
            } => format!("{} {} ?", self.wrap(column), operator.as_sql()),
            WhereClause::In { column, values } => {
                if values.is_empty() {
                    "0 = 1".to_string()
                } else {
                    format!("{} in ({})", self.wrap(column), self.parameterize(values.len()))
                }
            }
            WhereClause::InRaw { column, values } => {
                if values.is_empty() {
                    "0 = 1".to_string()
                } else {
                    let list: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                    format!("{} in ({})", self.wrap(column), list.join(", "))
                }
            }
            WhereClause::Null { column, negated } => {
                if *negated {
                    format!("{} is not null", self.wrap(column))
                } else {
                    format!("{} is null", self.wrap(column))
                }
            }
            WhereClause::Raw { sql } => sql.clone(),
        }
    }

    /// `select count(*)` replacing the projection of `query`
    fn compile_count(&self, query: &Query) -> CompiledQuery {
        let counted = query
            .clone()
            .select([Selector::raw("count(*) as aggregate")]);
        self.compile_select(&counted)
    }

    /// `select count(*) from (<query>)`
    fn compile_count_subquery(&self, query: &Query) -> CompiledQuery {
        let inner = self.compile_select(query);
        CompiledQuery::new(
            format!(
                "select count(*) as aggregate from ({}) as {}",
                inner.sql,
                self.wrap_table("temp_table")
            ),
            inner.bindings,
        )
    }

    /// Upcast helper for default methods
    fn as_dyn(&self) -> &dyn Grammar;
}

/// SQLite dialect (double-quoted identifiers)
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteGrammar;

impl Grammar for SqliteGrammar {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote(&self) -> char {
        '"'
    }

    fn as_dyn(&self) -> &dyn Grammar {
        self
    }
}

/// MySQL dialect (backtick identifiers)
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlGrammar;

impl Grammar for MySqlGrammar {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote(&self) -> char {
        '`'
    }

    fn compile_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        let offset = offset.filter(|o| *o > 0);
        match (limit, offset) {
            (Some(limit), Some(offset)) => format!(" limit {} offset {}", limit, offset),
            (Some(limit), None) => format!(" limit {}", limit),
            (None, Some(offset)) => format!(" limit 18446744073709551615 offset {}", offset),
            (None, None) => String::new(),
        }
    }

    fn as_dyn(&self) -> &dyn Grammar {
        self
    }
}

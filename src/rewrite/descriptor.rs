//! Query descriptor
//!
//! Read-only view of the query shape the rewrite decisions are made from. Column
//! references are resolved to text through the grammar once, so later checks can
//! compare quoted and unquoted forms uniformly.

use crate::model::{KeyType, ModelMeta};
use crate::query::{Grammar, Query, Selector};

/// A projected column and its rendered SQL
#[derive(Debug, Clone, PartialEq)]
pub struct Projected<'q> {
    pub selector: &'q Selector,
    pub rendered: String,
}

/// Structural view of a query, borrowed from it
#[derive(Debug, Clone)]
pub struct QueryDescriptor<'q> {
    pub table: &'q str,
    pub key_name: &'q str,
    pub key_type: KeyType,
    pub projection: Vec<Projected<'q>>,
    /// Textual and wrapped form of every ORDER BY column
    pub order_targets: Vec<String>,
    /// Named ORDER BY columns, as written
    pub order_columns: Vec<&'q str>,
    /// Textual and wrapped form of every HAVING column
    pub having_targets: Vec<String>,
    /// GROUP BY expressions in textual form
    pub groups: Vec<String>,
    pub has_havings: bool,
    pub has_unions: bool,
}

impl<'q> QueryDescriptor<'q> {
    pub fn extract(query: &'q Query, meta: &'q ModelMeta, grammar: &dyn Grammar) -> Self {
        let projection = query
            .columns
            .iter()
            .map(|selector| Projected {
                selector,
                rendered: selector.render(grammar),
            })
            .collect();

        let order_targets = query
            .orders
            .iter()
            .filter_map(|order| order.column())
            .flat_map(|column| targets(column, grammar))
            .collect();

        let order_columns = query
            .orders
            .iter()
            .filter_map(|order| order.column())
            .filter_map(Selector::as_column)
            .collect();

        let having_targets = query
            .havings
            .iter()
            .filter_map(|having| having.column())
            .flat_map(|column| targets(column, grammar))
            .collect();

        let groups = query.groups.iter().map(|g| g.text(grammar)).collect();

        Self {
            table: &meta.table,
            key_name: &meta.key_name,
            key_type: meta.key_type,
            projection,
            order_targets,
            order_columns,
            having_targets,
            groups,
            has_havings: !query.havings.is_empty(),
            has_unions: !query.unions.is_empty(),
        }
    }

    pub fn has_group_by(&self) -> bool {
        !self.groups.is_empty()
    }

    pub fn qualified_key(&self) -> String {
        format!("{}.{}", self.table, self.key_name)
    }

    /// True when `reference` names the primary key, qualified or not, quoted or not
    pub fn is_key_reference(&self, reference: &str) -> bool {
        let bare = strip_quotes(reference);
        bare == self.key_name || bare == self.qualified_key()
    }
}

/// Unquoted and quoted forms of a column reference
fn targets(column: &Selector, grammar: &dyn Grammar) -> [String; 2] {
    let text = column.text(grammar);
    let wrapped = grammar.wrap(&text);
    [text, wrapped]
}

fn strip_quotes(reference: &str) -> String {
    reference
        .trim()
        .chars()
        .filter(|c| !matches!(c, '"' | '`' | '[' | ']'))
        .collect()
}

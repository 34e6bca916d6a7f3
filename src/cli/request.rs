//! Query documents
//!
//! The JSON shape the CLI accepts on stdin:
//!
//! ```json
//! {
//!   "table": "posts",
//!   "key": "id",
//!   "key_type": "int",
//!   "select": ["posts.*", {"raw": "length(title) as title_length"}],
//!   "joins": [{"table": "users", "first": "users.id", "second": "posts.author_id"}],
//!   "wheres": [{"column": "users.active", "value": 1}],
//!   "group_by": [],
//!   "having": [],
//!   "order_by": [{"column": "created_at", "direction": "desc"}],
//!   "per_page": 10,
//!   "page": 2
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::model::{KeyType, ModelMeta, ModelQuery, Record};
use crate::pagination::{PaginationRequest, PerPage};
use crate::query::{Direction, JoinKind, Operator, Query, Selector};

use super::errors::{CliError, CliResult};

/// A paginated query described as JSON
#[derive(Debug, Clone, Deserialize)]
pub struct QueryDocument {
    pub table: String,
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default = "default_key_type")]
    pub key_type: String,
    #[serde(default)]
    pub select: Vec<SelectItem>,
    #[serde(default)]
    pub joins: Vec<JoinItem>,
    #[serde(default)]
    pub wheres: Vec<WhereItem>,
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub having: Vec<HavingItem>,
    #[serde(default)]
    pub order_by: Vec<OrderItem>,
    /// Page size; `-1` requests every row
    #[serde(default)]
    pub per_page: Option<i64>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub page_name: Option<String>,
    /// Projection used when `select` is empty
    #[serde(default)]
    pub columns: Vec<String>,
}

fn default_key() -> String {
    "id".to_string()
}

fn default_key_type() -> String {
    "int".to_string()
}

fn default_operator() -> Operator {
    Operator::Eq
}

fn default_join_kind() -> JoinKind {
    JoinKind::Inner
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SelectItem {
    Column(String),
    Raw {
        raw: String,
        #[serde(default)]
        bindings: Vec<Value>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinItem {
    pub table: String,
    pub first: String,
    #[serde(default = "default_operator")]
    pub operator: Operator,
    pub second: String,
    #[serde(default = "default_join_kind")]
    pub kind: JoinKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WhereItem {
    In {
        column: String,
        #[serde(rename = "in")]
        values: Vec<Value>,
    },
    Null {
        column: String,
        null: bool,
    },
    Raw {
        raw: String,
        #[serde(default)]
        bindings: Vec<Value>,
    },
    Basic {
        column: String,
        #[serde(default = "default_operator")]
        op: Operator,
        value: Value,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HavingItem {
    Raw {
        raw: String,
        #[serde(default)]
        bindings: Vec<Value>,
    },
    Basic {
        column: String,
        #[serde(default = "default_operator")]
        op: Operator,
        value: Value,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderItem {
    Raw {
        raw: String,
        #[serde(default)]
        bindings: Vec<Value>,
    },
    Column {
        column: String,
        #[serde(default)]
        direction: Direction,
    },
}

impl QueryDocument {
    pub fn from_value(value: Value) -> CliResult<Self> {
        let document: QueryDocument = serde_json::from_value(value)?;
        if document.table.trim().is_empty() {
            return Err(CliError::invalid_request("table must not be empty"));
        }
        Ok(document)
    }

    pub fn meta(&self) -> ModelMeta {
        ModelMeta::new(
            self.table.clone(),
            self.key.clone(),
            KeyType::from_declared(&self.key_type),
        )
    }

    /// Builds the query the document describes
    pub fn to_query(&self) -> Query {
        let mut query = Query::table(self.table.clone());

        for item in &self.select {
            query = match item {
                SelectItem::Column(name) => query.add_select(name.as_str()),
                SelectItem::Raw { raw, bindings } => query.select_raw(raw.clone(), bindings.clone()),
            };
        }

        for join in &self.joins {
            query = match join.kind {
                JoinKind::Inner => query.join(&join.table, &join.first, join.operator, &join.second),
                JoinKind::Left => query.left_join(&join.table, &join.first, join.operator, &join.second),
            };
        }

        for item in &self.wheres {
            query = match item {
                WhereItem::In { column, values } => query.where_in(column, values.clone()),
                WhereItem::Null { column, null: true } => query.where_null(column),
                WhereItem::Null { column, null: false } => query.where_not_null(column),
                WhereItem::Raw { raw, bindings } => query.where_raw(raw.clone(), bindings.clone()),
                WhereItem::Basic { column, op, value } => query.where_op(column, *op, value.clone()),
            };
        }

        for group in &self.group_by {
            query = query.group_by(group.as_str());
        }

        for item in &self.having {
            query = match item {
                HavingItem::Raw { raw, bindings } => query.having_raw(raw.clone(), bindings.clone()),
                HavingItem::Basic { column, op, value } => {
                    query.having(column.as_str(), *op, value.clone())
                }
            };
        }

        for item in &self.order_by {
            query = match item {
                OrderItem::Raw { raw, bindings } => query.order_by_raw(raw.clone(), bindings.clone()),
                OrderItem::Column { column, direction } => query.order_by(column.as_str(), *direction),
            };
        }

        query
    }

    pub fn to_model_query(&self) -> ModelQuery<Record> {
        ModelQuery::from_parts(self.meta(), self.to_query())
    }

    /// Pagination parameters from the document
    pub fn to_request(&self) -> CliResult<PaginationRequest> {
        let mut request = PaginationRequest::new();
        if let Some(raw) = self.per_page {
            let per_page = PerPage::from_raw(raw).ok_or_else(|| {
                CliError::invalid_request(format!("per_page must be positive or -1, got {}", raw))
            })?;
            request = request.per_page(per_page);
        }
        if let Some(page) = self.page {
            request = request.page(page);
        }
        if let Some(page_name) = &self.page_name {
            request = request.page_name(page_name.clone());
        }
        if !self.columns.is_empty() {
            request = request.columns(self.columns.iter().map(|c| Selector::column(c.clone())));
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SqliteGrammar;
    use serde_json::json;

    #[test]
    fn test_full_document() {
        let document = QueryDocument::from_value(json!({
            "table": "posts",
            "select": ["posts.*", {"raw": "length(title) as title_length"}],
            "joins": [{"table": "users", "first": "users.id", "second": "posts.author_id", "kind": "left"}],
            "wheres": [
                {"column": "users.active", "value": 1},
                {"column": "posts.status", "in": ["draft", "live"]},
                {"column": "posts.deleted_at", "null": true},
                {"column": "posts.score", "op": ">", "value": 3}
            ],
            "order_by": [{"column": "title_length", "direction": "desc"}, {"raw": "posts.id asc"}],
            "per_page": 10,
            "page": 2
        }))
        .unwrap();

        let sql = document.to_query().to_sql(&SqliteGrammar).sql;
        assert_eq!(
            sql,
            "select \"posts\".*, length(title) as title_length from \"posts\" \
             left join \"users\" on \"users\".\"id\" = \"posts\".\"author_id\" \
             where \"users\".\"active\" = ? and \"posts\".\"status\" in (?, ?) \
             and \"posts\".\"deleted_at\" is null and \"posts\".\"score\" > ? \
             order by \"title_length\" desc, posts.id asc"
        );

        let request = document.to_request().unwrap();
        assert_eq!(request.per_page, Some(PerPage::Limit(10)));
        assert_eq!(request.page, Some(2));
        assert_eq!(document.meta().key_type, KeyType::Integer);
    }

    #[test]
    fn test_unlimited_and_invalid_page_size() {
        let unlimited = QueryDocument::from_value(json!({"table": "posts", "per_page": -1})).unwrap();
        assert_eq!(unlimited.to_request().unwrap().per_page, Some(PerPage::Unlimited));

        let zero = QueryDocument::from_value(json!({"table": "posts", "per_page": 0})).unwrap();
        let err = zero.to_request().unwrap_err();
        assert_eq!(err.code_str(), "FASTPAGE_CLI_INVALID_REQUEST");
    }

    #[test]
    fn test_string_keys() {
        let document =
            QueryDocument::from_value(json!({"table": "tokens", "key": "uuid", "key_type": "string"}))
                .unwrap();
        let meta = document.meta();
        assert_eq!(meta.qualified_key(), "tokens.uuid");
        assert_eq!(meta.key_type, KeyType::String);
    }

    #[test]
    fn test_missing_table_rejected() {
        assert!(QueryDocument::from_value(json!({"per_page": 5})).is_err());
        assert!(QueryDocument::from_value(json!({"table": " "})).is_err());
    }
}

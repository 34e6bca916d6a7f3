//! Model-bound query

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::connection::{Connection, Row};
use crate::query::{Direction, Operator, Query, Selector};

use super::entity::Entity;
use super::errors::ModelResult;
use super::meta::ModelMeta;

/// A query bound to a model: metadata, the base query and eager load directives.
///
/// Builder methods forward to the base `Query` by value.
pub struct ModelQuery<E> {
    meta: ModelMeta,
    query: Query,
    eager_loads: Vec<String>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for ModelQuery<E> {
    fn clone(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            query: self.query.clone(),
            eager_loads: self.eager_loads.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for ModelQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelQuery")
            .field("meta", &self.meta)
            .field("query", &self.query)
            .field("eager_loads", &self.eager_loads)
            .finish()
    }
}

impl<E> ModelQuery<E> {
    pub fn new(meta: ModelMeta) -> Self {
        let query = Query::table(meta.table.clone());
        Self::from_parts(meta, query)
    }

    /// Binds an existing query to the model metadata
    pub fn from_parts(meta: ModelMeta, query: Query) -> Self {
        Self {
            meta,
            query,
            eager_loads: Vec::new(),
            _entity: PhantomData,
        }
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// The base query
    pub fn base(&self) -> &Query {
        &self.query
    }

    pub fn eager_loads(&self) -> &[String] {
        &self.eager_loads
    }

    pub fn into_base(self) -> Query {
        self.query
    }

    /// Applies `f` to the base query
    pub fn map_base(mut self, f: impl FnOnce(Query) -> Query) -> Self {
        self.query = f(self.query);
        self
    }

    /// Adds an eager load directive
    pub fn with(mut self, relation: impl Into<String>) -> Self {
        self.eager_loads.push(relation.into());
        self
    }

    pub fn without_eager_loads(mut self) -> Self {
        self.eager_loads.clear();
        self
    }

    pub fn select<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        self.map_base(|q| q.select(columns))
    }

    pub fn add_select(self, column: impl Into<Selector>) -> Self {
        self.map_base(|q| q.add_select(column))
    }

    pub fn select_raw(self, sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        self.map_base(|q| q.select_raw(sql, bindings))
    }

    pub fn join(
        self,
        table: impl Into<String>,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.map_base(|q| q.join(table, first, operator, second))
    }

    pub fn left_join(
        self,
        table: impl Into<String>,
        first: impl Into<String>,
        operator: Operator,
        second: impl Into<String>,
    ) -> Self {
        self.map_base(|q| q.left_join(table, first, operator, second))
    }

    pub fn where_op(self, column: impl Into<String>, operator: Operator, value: Value) -> Self {
        self.map_base(|q| q.where_op(column, operator, value))
    }

    pub fn where_eq(self, column: impl Into<String>, value: Value) -> Self {
        self.map_base(|q| q.where_eq(column, value))
    }

    pub fn where_in(self, column: impl Into<String>, values: Vec<Value>) -> Self {
        self.map_base(|q| q.where_in(column, values))
    }

    pub fn where_null(self, column: impl Into<String>) -> Self {
        self.map_base(|q| q.where_null(column))
    }

    pub fn where_not_null(self, column: impl Into<String>) -> Self {
        self.map_base(|q| q.where_not_null(column))
    }

    pub fn where_raw(self, sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        self.map_base(|q| q.where_raw(sql, bindings))
    }

    pub fn group_by(self, column: impl Into<Selector>) -> Self {
        self.map_base(|q| q.group_by(column))
    }

    pub fn having(self, column: impl Into<Selector>, operator: Operator, value: Value) -> Self {
        self.map_base(|q| q.having(column, operator, value))
    }

    pub fn having_raw(self, sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        self.map_base(|q| q.having_raw(sql, bindings))
    }

    pub fn order_by(self, column: impl Into<Selector>, direction: Direction) -> Self {
        self.map_base(|q| q.order_by(column, direction))
    }

    pub fn order_by_desc(self, column: impl Into<Selector>) -> Self {
        self.map_base(|q| q.order_by_desc(column))
    }

    pub fn order_by_raw(self, sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        self.map_base(|q| q.order_by_raw(sql, bindings))
    }

    pub fn union(self, query: Query) -> Self {
        self.map_base(|q| q.union(query))
    }

    pub fn union_all(self, query: Query) -> Self {
        self.map_base(|q| q.union_all(query))
    }
}

impl<E: Entity> ModelQuery<E> {
    /// Executes the query and hydrates every row
    pub fn get(&self, conn: &mut dyn Connection) -> ModelResult<Vec<E>> {
        let rows = self.query.get(conn)?;
        self.hydrate(rows, conn)
    }

    /// Hydrates rows into entities and runs the eager load hook
    pub(crate) fn hydrate(&self, rows: Vec<Row>, conn: &mut dyn Connection) -> ModelResult<Vec<E>> {
        let mut models = rows
            .into_iter()
            .map(|row| serde_json::from_value(Value::Object(row)))
            .collect::<Result<Vec<E>, _>>()?;

        if !self.eager_loads.is_empty() && !models.is_empty() {
            E::load_relations(&mut models, &self.eager_loads, conn)?;
        }
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{KeyType, Record};
    use serde_json::json;

    fn posts() -> ModelQuery<Record> {
        ModelQuery::new(ModelMeta::new("posts", "id", KeyType::Integer))
    }

    #[test]
    fn test_forwarding_builds_base_query() {
        let query = posts()
            .where_eq("author_id", json!(4))
            .order_by_desc("created_at")
            .with("author");

        assert_eq!(query.base().table, "posts");
        assert_eq!(query.base().wheres.len(), 1);
        assert_eq!(query.base().orders.len(), 1);
        assert_eq!(query.eager_loads(), &["author".to_string()]);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = posts().with("author");
        let stripped = original.clone().without_eager_loads().where_eq("id", json!(1));

        assert_eq!(original.eager_loads().len(), 1);
        assert!(original.base().wheres.is_empty());
        assert!(stripped.eager_loads().is_empty());
    }
}

//! Outer row fetch
//!
//! Pins the original query to the extracted keys and fetches full rows. The
//! original ORDER BY, JOIN, GROUP BY and HAVING clauses are still on the query, so
//! rows come back in result order without re-sorting by key sequence.

use serde_json::Value;

use crate::connection::Connection;
use crate::model::{Entity, ModelQuery};
use crate::pagination::{
    CountStrategy, PageWindow, PaginationError, PaginationResult, PaginationStrategy,
    ResolvedRequest, Simple,
};
use crate::query::Query;

/// Adds `table.key in (keys)` to a copy of `query`.
///
/// Integer keys are inlined; any other key type is bound.
pub fn restrict_to_keys<E>(model: &ModelQuery<E>, keys: &[Value]) -> PaginationResult<ModelQuery<E>> {
    let column = model.meta().qualified_key();
    if model.meta().key_type.is_integer() {
        let ints = keys
            .iter()
            .map(integer_key)
            .collect::<PaginationResult<Vec<i64>>>()?;
        Ok(model
            .clone()
            .map_base(|q| q.where_integer_in_raw(column, ints)))
    } else {
        let values = keys.to_vec();
        Ok(model.clone().map_base(|q| q.where_in(column, values)))
    }
}

/// Outer query at page 1 with the requested page size
pub fn outer_window(resolved: &ResolvedRequest) -> PageWindow {
    PageWindow::new(resolved.window.per_page, 1)
}

/// Fetches and hydrates the full rows for `keys`
pub fn fetch_rows<E: Entity>(
    conn: &mut dyn Connection,
    model: &ModelQuery<E>,
    keys: &[Value],
    resolved: &ResolvedRequest,
) -> PaginationResult<Vec<E>> {
    let pinned = restrict_to_keys(model, keys)?;
    let query: Query = pinned.base().clone().with_default_columns(&resolved.columns);

    // has-more of this fetch is meaningless; the key set is exact
    let (rows, _) = Simple::fetch_page(
        conn,
        &query,
        outer_window(resolved),
        CountStrategy::Auto,
        None,
    )?;

    Ok(pinned.hydrate(rows, conn)?)
}

/// Key value as an integer for the inlined membership list
fn integer_key(value: &Value) -> PaginationResult<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| PaginationError::InvalidKey(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{KeyType, ModelMeta, Record};
    use crate::query::SqliteGrammar;
    use serde_json::json;

    fn model(key_type: KeyType) -> ModelQuery<Record> {
        ModelQuery::new(ModelMeta::new("posts", "id", key_type)).order_by_desc("created_at")
    }

    #[test]
    fn test_integer_keys_are_inlined() {
        let pinned = restrict_to_keys(&model(KeyType::Integer), &[json!(3), json!("4")]).unwrap();
        let compiled = pinned.base().to_sql(&SqliteGrammar);
        assert_eq!(
            compiled.sql,
            "select * from \"posts\" where \"posts\".\"id\" in (3, 4) order by \"created_at\" desc"
        );
        assert!(compiled.bindings.is_empty());
    }

    #[test]
    fn test_other_keys_are_bound() {
        let pinned = restrict_to_keys(&model(KeyType::String), &[json!("a1"), json!("b2")]).unwrap();
        let compiled = pinned.base().to_sql(&SqliteGrammar);
        assert!(compiled.sql.contains("\"posts\".\"id\" in (?, ?)"));
        assert_eq!(compiled.bindings, vec![json!("a1"), json!("b2")]);
    }

    #[test]
    fn test_non_integer_key_is_rejected() {
        let err = restrict_to_keys(&model(KeyType::Integer), &[json!("abc")]).unwrap_err();
        assert!(matches!(err, PaginationError::InvalidKey(_)));

        let err = restrict_to_keys(&model(KeyType::Integer), &[json!(1.5)]).unwrap_err();
        assert!(matches!(err, PaginationError::InvalidKey(_)));
    }

    #[test]
    fn test_original_is_untouched() {
        let original = model(KeyType::Integer);
        let _ = restrict_to_keys(&original, &[json!(1)]).unwrap();
        assert!(original.base().wheres.is_empty());
    }
}

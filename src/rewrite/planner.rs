//! Inner projection planner
//!
//! Computes the projection of the key-only query: the primary key first, then
//! every projected expression an ORDER BY or HAVING refers to by alias, then any
//! plain ORDER BY column not already covered. Nothing else affects which rows
//! land on the page.
//!
//! DISTINCT on the key is only used when the key is the sole selected column;
//! any further column would make DISTINCT operate on pairs.

use crate::query::{Grammar, Selector};

use super::descriptor::QueryDescriptor;
use super::distinct;
use super::errors::{Incompatibility, PlanResult};

/// Projection of the key-only query
#[derive(Debug, Clone, PartialEq)]
pub struct InnerPlan {
    /// Primary key selector first, no duplicates
    pub selectors: Vec<Selector>,
    /// GROUP BY is dropped and the key selected with DISTINCT
    pub replaces_group_by: bool,
}

impl InnerPlan {
    pub fn key_selector(&self) -> Option<&Selector> {
        self.selectors.first()
    }
}

/// Plans the key-only projection.
///
/// Fails when a retained expression contains a `?` marker: its bound value does
/// not travel with it into the new projection.
pub fn plan_inner(desc: &QueryDescriptor<'_>, grammar: &dyn Grammar) -> PlanResult<InnerPlan> {
    let retained: Vec<&Selector> = desc
        .projection
        .iter()
        .filter(|p| {
            desc.order_targets
                .iter()
                .chain(desc.having_targets.iter())
                .any(|target| references_alias(&p.rendered, target))
        })
        .map(|p| p.selector)
        .collect();

    for selector in &retained {
        let text = selector.text(grammar);
        if text.contains('?') {
            return Err(Incompatibility::bound_parameter(text));
        }
    }

    let mut supplemented: Vec<&str> = Vec::new();
    let mut supplement = Vec::new();
    for column in &desc.order_columns {
        let covered = retained.iter().any(|s| {
            let rendered = s.render(grammar);
            references_alias(&rendered, column) || references_alias(&rendered, &grammar.wrap(column))
        });
        if covered || desc.is_key_reference(column) || supplemented.contains(column) {
            continue;
        }
        supplemented.push(*column);
        supplement.push(order_selector(desc, column, supplement.len() + 1));
    }

    let extra: Vec<&Selector> = retained.iter().copied().chain(supplement.iter()).collect();
    let replaces_group_by = distinct::can_replace_group_by_with_distinct(desc, &extra);

    let mut selectors = Vec::with_capacity(extra.len() + 1);
    selectors.push(distinct::key_selector(desc, replaces_group_by));
    selectors.extend(extra.into_iter().cloned());

    Ok(InnerPlan {
        selectors: dedupe(selectors, grammar),
        replaces_group_by,
    })
}

/// Selector for an ORDER BY column the projection does not already carry.
///
/// Drivers name result columns by their last segment, so a joined column such as
/// `users.id` would shadow the key in the row; those are selected under an alias.
fn order_selector(desc: &QueryDescriptor<'_>, column: &str, position: usize) -> Selector {
    let name = column
        .rsplit('.')
        .next()
        .unwrap_or(column)
        .trim_matches(|c| matches!(c, '"' | '`' | '[' | ']'));
    if name.eq_ignore_ascii_case(desc.key_name) {
        Selector::column(format!("{} as {}{}", column, ORDER_ALIAS_PREFIX, position))
    } else {
        Selector::column(column)
    }
}

/// Alias prefix for ORDER BY columns that would collide with the key column name
const ORDER_ALIAS_PREFIX: &str = "fastpage_order_";

/// True when `rendered` contains `as <alias>` (keyword in any case, alias followed
/// by an identifier boundary)
pub fn references_alias(rendered: &str, alias: &str) -> bool {
    if alias.is_empty() {
        return false;
    }
    let bytes = rendered.as_bytes();
    let lowered = rendered.to_ascii_lowercase();

    lowered.match_indices("as").any(|(idx, _)| {
        if idx > 0 && is_ident_byte(bytes[idx - 1]) {
            return false;
        }
        let rest = &rendered[idx + 2..];
        let trimmed = rest.trim_start();
        if trimmed.len() == rest.len() {
            return false;
        }
        match trimmed.strip_prefix(alias) {
            Some(after) => after.bytes().next().map_or(true, |b| !is_ident_byte(b)),
            None => false,
        }
    })
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Drops repeated selectors (by rendered SQL), keeping first occurrences
fn dedupe(selectors: Vec<Selector>, grammar: &dyn Grammar) -> Vec<Selector> {
    let mut seen = Vec::with_capacity(selectors.len());
    let mut unique = Vec::with_capacity(selectors.len());
    for selector in selectors {
        let rendered = selector.render(grammar);
        if !seen.contains(&rendered) {
            seen.push(rendered);
            unique.push(selector);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{KeyType, ModelMeta};
    use crate::query::{Direction, Operator, Query, SqliteGrammar};
    use serde_json::json;

    fn meta() -> ModelMeta {
        ModelMeta::new("posts", "id", KeyType::Integer)
    }

    fn plan(query: &Query) -> PlanResult<InnerPlan> {
        let meta = meta();
        let desc = QueryDescriptor::extract(query, &meta, &SqliteGrammar);
        plan_inner(&desc, &SqliteGrammar)
    }

    fn plan_of(query: &Query) -> InnerPlan {
        plan(query).unwrap()
    }

    fn rendered(plan: &InnerPlan) -> Vec<String> {
        plan.selectors.iter().map(|s| s.render(&SqliteGrammar)).collect()
    }

    #[test]
    fn test_alias_matching() {
        assert!(references_alias("length(title) as title_length", "title_length"));
        assert!(references_alias("length(title) AS title_length", "title_length"));
        assert!(references_alias("\"title\" as \"t\"", "\"t\""));
        assert!(!references_alias("\"title\" as \"title_length\"", "title"));
        assert!(!references_alias("length(title) as title_length", "title"));
        assert!(!references_alias("alias_count", "count"));
        assert!(!references_alias("has_comments", "comments"));
    }

    #[test]
    fn test_plain_order_column_is_selected() {
        let plan = plan(&Query::table("posts").order_by_desc("created_at")).unwrap();
        assert_eq!(rendered(&plan), vec!["\"posts\".\"id\"", "\"created_at\""]);
        assert!(!plan.replaces_group_by);
    }

    #[test]
    fn test_unreferenced_projection_is_dropped() {
        let query = Query::table("posts")
            .select(["posts.*", "title as headline"])
            .select_raw("length(body) as body_length", vec![])
            .order_by("body_length", Direction::Desc);
        let plan = plan(&query).unwrap();
        assert_eq!(
            rendered(&plan),
            vec!["\"posts\".\"id\"", "length(body) as body_length"]
        );
    }

    #[test]
    fn test_having_alias_is_retained() {
        let query = Query::table("posts")
            .select(["posts.*"])
            .select_raw("count(comments.id) as comment_count", vec![])
            .left_join("comments", "comments.post_id", Operator::Eq, "posts.id")
            .group_by("posts.id")
            .having("comment_count", Operator::Gte, json!(2));
        let plan = plan(&query).unwrap();
        assert_eq!(
            rendered(&plan),
            vec!["\"posts\".\"id\"", "count(comments.id) as comment_count"]
        );
        assert!(!plan.replaces_group_by);
    }

    #[test]
    fn test_group_by_key_uses_distinct() {
        let query = Query::table("posts")
            .join("comments", "comments.post_id", Operator::Eq, "posts.id")
            .group_by("posts.id");
        let plan = plan(&query).unwrap();
        assert!(plan.replaces_group_by);
        assert_eq!(rendered(&plan), vec!["DISTINCT posts.id"]);
    }

    #[test]
    fn test_bound_parameter_is_incompatible() {
        let query = Query::table("posts")
            .select_raw("abs(score - ?) as distance", vec![json!(50)])
            .order_by("distance", Direction::Asc);
        let err = plan(&query).unwrap_err();
        assert_eq!(err.code().code(), "FAST_PAGINATE_BOUND_PARAMETER");
    }

    #[test]
    fn test_parameter_in_dropped_column_is_fine() {
        let query = Query::table("posts")
            .select_raw("abs(score - ?) as distance", vec![json!(50)])
            .order_by_desc("created_at");
        assert!(plan(&query).is_ok());
    }

    #[test]
    fn test_key_first_and_unique() {
        let query = Query::table("posts")
            .select(["posts.id", "title as t", "title as t"])
            .order_by("t", Direction::Asc)
            .order_by("posts.id", Direction::Asc)
            .order_by("t", Direction::Desc)
            .having("t", Operator::NotEq, json!(""));
        let plan = plan(&query).unwrap();
        let rendered = rendered(&plan);
        assert_eq!(rendered[0], "\"posts\".\"id\"");
        assert_eq!(rendered, vec!["\"posts\".\"id\"", "\"title\" as \"t\""]);
    }

    #[test]
    fn test_order_by_key_adds_nothing() {
        let plan = plan(&Query::table("posts").order_by_desc("id")).unwrap();
        assert_eq!(rendered(&plan), vec!["\"posts\".\"id\""]);
    }

    #[test]
    fn test_joined_order_column_keeps_grouping() {
        let query = Query::table("posts")
            .select(["posts.*"])
            .join("comments", "comments.post_id", Operator::Eq, "posts.id")
            .group_by("posts.id")
            .order_by("comments.weight", Direction::Asc);
        let plan = plan(&query).unwrap();
        assert!(!plan.replaces_group_by);
        assert_eq!(rendered(&plan), vec!["\"posts\".\"id\"", "\"comments\".\"weight\""]);

        let aliased = Query::table("posts")
            .select(["posts.*", "comments.body as body"])
            .join("comments", "comments.post_id", Operator::Eq, "posts.id")
            .group_by("posts.id")
            .order_by("body", Direction::Asc);
        assert!(!plan_of(&aliased).replaces_group_by);
    }

    #[test]
    fn test_joined_key_name_is_aliased() {
        let query = Query::table("posts")
            .join("users", "users.id", Operator::Eq, "posts.author_id")
            .order_by("users.id", Direction::Asc)
            .order_by("users.name", Direction::Asc)
            .order_by("users.id", Direction::Desc)
            .order_by("posts.id", Direction::Asc);
        assert_eq!(
            rendered(&plan_of(&query)),
            vec![
                "\"posts\".\"id\"",
                "\"users\".\"id\" as \"fastpage_order_1\"",
                "\"users\".\"name\"",
            ]
        );
    }

    #[test]
    fn test_key_first_without_duplicates_across_shapes() {
        let projections: Vec<Query> = vec![
            Query::table("posts"),
            Query::table("posts").select(["posts.*", "title as t"]),
            Query::table("posts")
                .select(["posts.id", "title as t", "posts.id"])
                .select_raw("length(body) as body_length", vec![]),
        ];
        let orders: [&[&str]; 4] = [
            &[],
            &["t", "created_at"],
            &["body_length", "posts.id", "t", "body_length"],
            &["users.id", "id", "users.id"],
        ];
        let havings: [&[&str]; 3] = [&[], &["t"], &["body_length", "t"]];
        let groups: [&[&str]; 2] = [&[], &["posts.id"]];

        for base in &projections {
            for order in orders {
                for having in havings {
                    for group in groups {
                        let mut query = base.clone();
                        for column in order {
                            query = query.order_by(*column, Direction::Asc);
                        }
                        for column in having {
                            query = query.having(*column, Operator::Gt, json!(0));
                        }
                        for column in group {
                            query = query.group_by(*column);
                        }

                        let plan = plan_of(&query);
                        let rendered = rendered(&plan);
                        let shape = format!("{:?} / {:?} / {:?}", order, having, group);

                        assert!(
                            rendered[0] == "\"posts\".\"id\"" || rendered[0] == "DISTINCT posts.id",
                            "key not first: {}",
                            shape
                        );
                        let mut unique = rendered.clone();
                        unique.sort();
                        unique.dedup();
                        assert_eq!(unique.len(), rendered.len(), "duplicates: {}", shape);
                        assert!(
                            !plan.replaces_group_by || rendered.len() == 1,
                            "DISTINCT with extra columns: {}",
                            shape
                        );
                    }
                }
            }
        }
    }
}

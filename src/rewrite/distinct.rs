//! Group-by to distinct
//!
//! `group by posts.id` on the key-only query is replaced by
//! `select DISTINCT posts.id`, which yields the same key set and is cheaper to
//! execute.

use crate::query::Selector;

use super::descriptor::QueryDescriptor;

/// True when the query is grouped and every group expression is the primary key
pub fn groups_only_by_key(desc: &QueryDescriptor<'_>) -> bool {
    desc.has_group_by() && desc.groups.iter().all(|group| desc.is_key_reference(group))
}

/// True when the key-only query can drop GROUP BY in favour of DISTINCT.
///
/// `extra` holds every selector planned next to the key. HAVING conditions and
/// aggregates need the grouping; any other column would turn the DISTINCT into
/// one over (key, column) pairs, repeating keys for one-to-many joins.
pub fn can_replace_group_by_with_distinct(
    desc: &QueryDescriptor<'_>,
    extra: &[&Selector],
) -> bool {
    groups_only_by_key(desc) && !desc.has_havings && extra.is_empty()
}

/// Key selector for the key-only query
pub fn key_selector(desc: &QueryDescriptor<'_>, distinct: bool) -> Selector {
    if distinct {
        Selector::raw(format!("DISTINCT {}", desc.qualified_key()))
    } else {
        Selector::column(desc.qualified_key())
    }
}

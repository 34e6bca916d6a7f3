//! Compatibility guard and entry points
//!
//! Every shape the rewrite cannot split safely goes through unmodified pagination
//! instead. Fallbacks are invisible to callers: same result type, same items,
//! logged at TRACE only.

use crate::config::PaginationConfig;
use crate::connection::Connection;
use crate::model::{Entity, ModelMeta, ModelQuery};
use crate::observability::Logger;
use crate::pagination::{
    LengthAware, LengthAwarePaginator, PaginationRequest, PaginationResult, PaginationStrategy,
    ResolvedRequest, Simple, SimplePaginator,
};
use crate::query::{Grammar, Query};

use super::assembler;
use super::descriptor::QueryDescriptor;
use super::distinct;
use super::errors::{Incompatibility, PlanResult};
use super::fetch;
use super::pager;
use super::planner::{self, InnerPlan};
use super::registry::registry;

impl<E: Entity> ModelQuery<E> {
    /// Length-aware pagination through a key-only query
    pub fn fast_paginate(
        &self,
        conn: &mut dyn Connection,
        request: &PaginationRequest,
    ) -> PaginationResult<LengthAwarePaginator<E>> {
        self.fast_paginate_with::<LengthAware>(conn, request)
    }

    /// Simple pagination through a key-only query
    pub fn simple_fast_paginate(
        &self,
        conn: &mut dyn Connection,
        request: &PaginationRequest,
    ) -> PaginationResult<SimplePaginator<E>> {
        self.fast_paginate_with::<Simple>(conn, request)
    }

    pub fn fast_paginate_with<S: PaginationStrategy>(
        &self,
        conn: &mut dyn Connection,
        request: &PaginationRequest,
    ) -> PaginationResult<S::Output<E>> {
        let registry = registry();
        let resolved = registry.resolve(request, self.meta());
        run::<S, E>(self, conn, &resolved, registry.config())
    }
}

/// Rewritten pagination, or the unmodified path when the query is not eligible
pub(crate) fn run<S: PaginationStrategy, E: Entity>(
    model: &ModelQuery<E>,
    conn: &mut dyn Connection,
    resolved: &ResolvedRequest,
    config: &PaginationConfig,
) -> PaginationResult<S::Output<E>> {
    let table = model.meta().table.as_str();

    if resolved.window.per_page.is_unlimited() {
        Logger::trace(
            "FAST_PAGINATE_SKIPPED",
            &[("reason", "unlimited page size"), ("table", table)],
        );
        return model.paginate_resolved::<S>(conn, resolved);
    }

    let model = &model
        .clone()
        .map_base(|q| q.with_default_columns(&resolved.columns));

    let plan = match plan_rewrite(model.base(), model.meta(), conn.grammar(), config) {
        Ok(plan) => plan,
        Err(incompatibility) => {
            Logger::trace(
                "FAST_PAGINATE_FALLBACK",
                &[
                    ("code", incompatibility.code().code()),
                    ("reason", incompatibility.message()),
                    ("table", table),
                ],
            );
            return model.paginate_resolved::<S>(conn, resolved);
        }
    };

    Logger::trace(
        "FAST_PAGINATE_REWRITE",
        &[
            ("distinct", if plan.replaces_group_by { "true" } else { "false" }),
            ("mode", S::MODE.as_str()),
            ("table", table),
        ],
    );

    let page = pager::fetch_key_page::<S>(conn, model.base(), model.meta(), &plan, resolved)?;
    if page.keys.is_empty() {
        return Ok(assembler::empty::<S, E>(page.stats, resolved));
    }

    let items = fetch::fetch_rows(conn, model, &page.keys, resolved)?;
    Ok(assembler::assemble::<S, E>(items, page.stats, resolved))
}

/// Decides whether `query` can be rewritten and plans its key-only projection
pub fn plan_rewrite(
    query: &Query,
    meta: &ModelMeta,
    grammar: &dyn Grammar,
    config: &PaginationConfig,
) -> PlanResult<InnerPlan> {
    let desc = QueryDescriptor::extract(query, meta, grammar);
    if config.strict_grouping {
        check_shape(&desc)?;
    }
    planner::plan_inner(&desc, grammar)
}

/// Shapes whose inner rows need not map 1:1 onto result rows
fn check_shape(desc: &QueryDescriptor<'_>) -> PlanResult<()> {
    if desc.has_unions {
        return Err(Incompatibility::union());
    }
    if desc.has_group_by() && !distinct::groups_only_by_key(desc) {
        return Err(Incompatibility::non_key_grouping(desc.groups.join(", ")));
    }
    Ok(())
}

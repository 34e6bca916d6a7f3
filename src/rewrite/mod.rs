//! Fast pagination rewrite
//!
//! Splits one paginated query into a key-only query that decides page membership
//! (and carries the page statistics) and a full-row fetch restricted to those
//! keys. Pipeline:
//!
//! 1. `descriptor` reads the query shape
//! 2. `planner` computes the key-only projection (`distinct` decides DISTINCT vs GROUP BY)
//! 3. `pager` runs the key-only query with a subquery count
//! 4. `fetch` pins the original query to the keys and fetches rows
//! 5. `assembler` combines statistics and rows
//!
//! `guard` wraps the pipeline and falls back to unmodified pagination for shapes
//! it cannot split. `registry` exposes both entry points by capability name.

mod assembler;
mod descriptor;
mod distinct;
mod errors;
mod explain;
mod fetch;
mod guard;
mod pager;
mod planner;
pub mod registry;

pub use descriptor::{Projected, QueryDescriptor};
pub use errors::{Incompatibility, IncompatibilityCode, PlanResult};
pub use explain::RewriteExplain;
pub use guard::plan_rewrite;
pub use pager::{inner_query, KeyPage};
pub use planner::{references_alias, InnerPlan};
pub use registry::{
    install, install_with_resolver, registry, FirstPage, PageResolver, PaginatorRegistry,
    FAST_PAGINATE, SIMPLE_FAST_PAGINATE,
};

//! Result assembler
//!
//! Statistics from the key-only query, items from the row fetch.

use crate::pagination::{PaginationStrategy, ResolvedRequest};

/// Builds the final result for mode `S`
pub fn assemble<S: PaginationStrategy, E>(
    items: Vec<E>,
    stats: S::Stats,
    resolved: &ResolvedRequest,
) -> S::Output<E> {
    S::build(items, stats, resolved.options())
}

/// Result for a page with no keys; no row fetch happens
pub fn empty<S: PaginationStrategy, E>(stats: S::Stats, resolved: &ResolvedRequest) -> S::Output<E> {
    assemble::<S, E>(Vec::new(), stats, resolved)
}

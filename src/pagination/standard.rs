//! Unmodified pagination
//!
//! The plain offset/limit path. It is what the rewrite falls back to and what its
//! results are checked against.

use crate::connection::Connection;
use crate::model::{Entity, ModelQuery};
use crate::rewrite::registry;

use super::errors::PaginationResult;
use super::paginator::{LengthAwarePaginator, SimplePaginator};
use super::request::{PaginationRequest, ResolvedRequest};
use super::strategy::{CountStrategy, LengthAware, PaginationStrategy, Simple};

impl<E: Entity> ModelQuery<E> {
    /// Length-aware pagination: a count query, then the page rows
    pub fn paginate(
        &self,
        conn: &mut dyn Connection,
        request: &PaginationRequest,
    ) -> PaginationResult<LengthAwarePaginator<E>> {
        self.paginate_with::<LengthAware>(conn, request)
    }

    /// Simple pagination: the page rows plus one to detect a next page
    pub fn simple_paginate(
        &self,
        conn: &mut dyn Connection,
        request: &PaginationRequest,
    ) -> PaginationResult<SimplePaginator<E>> {
        self.paginate_with::<Simple>(conn, request)
    }

    /// Unmodified pagination with an explicit strategy
    pub fn paginate_with<S: PaginationStrategy>(
        &self,
        conn: &mut dyn Connection,
        request: &PaginationRequest,
    ) -> PaginationResult<S::Output<E>> {
        let resolved = registry().resolve(request, self.meta());
        self.paginate_resolved::<S>(conn, &resolved)
    }

    pub(crate) fn paginate_resolved<S: PaginationStrategy>(
        &self,
        conn: &mut dyn Connection,
        resolved: &ResolvedRequest,
    ) -> PaginationResult<S::Output<E>> {
        let query = self.base().clone().with_default_columns(&resolved.columns);
        let (rows, stats) = S::fetch_page(
            conn,
            &query,
            resolved.window,
            CountStrategy::Auto,
            resolved.count_query.as_ref(),
        )?;
        let items = self.hydrate(rows, conn)?;
        Ok(S::build(items, stats, resolved.options()))
    }
}

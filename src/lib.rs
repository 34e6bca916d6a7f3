//! fastpage - deferred-join offset pagination
//!
//! Pages over primary keys first, then fetches full rows for exactly those keys.
//! Queries the rewrite cannot split safely are paginated unmodified.
//!
//! ```ignore
//! use fastpage::model::Model;
//! use fastpage::pagination::{PaginationRequest, PerPage};
//!
//! let page = Post::query()
//!     .order_by_desc("created_at")
//!     .fast_paginate(&mut conn, &PaginationRequest::new().per_page(PerPage::Limit(10)).page(2))?;
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod model;
pub mod observability;
pub mod pagination;
pub mod query;
pub mod rewrite;

pub use config::PaginationConfig;
pub use model::{Entity, Model, ModelQuery, Record};
pub use pagination::{
    LengthAwarePaginator, Paginated, PaginationError, PaginationRequest, PerPage, SimplePaginator,
};

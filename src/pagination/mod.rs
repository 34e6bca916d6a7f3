//! Pagination subsystem
//!
//! Request resolution, result types, the two pagination strategies and the
//! unmodified pagination path on `ModelQuery`.

mod errors;
mod paginator;
mod request;
mod standard;
mod strategy;

pub use errors::{PaginationError, PaginationResult};
pub use paginator::{LengthAwarePaginator, Paginated, PaginatorOptions, SimplePaginator};
pub use request::{CountQueryCallback, PageWindow, PaginationRequest, PerPage, ResolvedRequest};
pub use strategy::{
    count_rows, CountStrategy, LengthAware, LengthAwareStats, PaginationMode, PaginationStrategy,
    Simple, SimpleStats,
};

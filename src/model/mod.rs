//! Model subsystem
//!
//! Entity metadata (table, primary key, key type, default page size), serde-based
//! hydration and the model-bound query used by both pagination paths.

mod entity;
mod errors;
mod meta;
mod query;

pub use entity::{Entity, Model, Record};
pub use errors::{ModelError, ModelResult};
pub use meta::{KeyType, ModelMeta};
pub use query::ModelQuery;

//! Entity hydration

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::{Connection, Row};

use super::errors::ModelResult;
use super::meta::{KeyType, ModelMeta};
use super::query::ModelQuery;

/// A type rows can be hydrated into
pub trait Entity: DeserializeOwned + Sized {
    /// Eager loads `relations` onto freshly hydrated models.
    ///
    /// Called once per fetch, after hydration, only when the query carries eager
    /// load directives.
    fn load_relations(
        _models: &mut [Self],
        _relations: &[String],
        _conn: &mut dyn Connection,
    ) -> ModelResult<()> {
        Ok(())
    }
}

/// An entity with static table metadata
pub trait Model: Entity {
    const TABLE: &'static str;
    const KEY_NAME: &'static str = "id";
    const KEY_TYPE: KeyType = KeyType::Integer;
    const PER_PAGE: u64 = ModelMeta::DEFAULT_PER_PAGE;

    fn meta() -> ModelMeta {
        ModelMeta::new(Self::TABLE, Self::KEY_NAME, Self::KEY_TYPE).with_per_page(Self::PER_PAGE)
    }

    /// New query over the model's table
    fn query() -> ModelQuery<Self> {
        ModelQuery::new(Self::meta())
    }
}

/// Untyped row entity for models described at runtime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Row);

impl Record {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn into_row(self) -> Row {
        self.0
    }
}

impl Entity for Record {}

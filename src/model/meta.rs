//! Model metadata

use serde::{Deserialize, Serialize};

/// Declared type of a primary key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// Integer-like key; membership filters inline the values
    #[default]
    Integer,
    /// Any other key type; membership filters bind the values
    String,
}

impl KeyType {
    /// Maps a declared key type name. Only `int` / `integer` are integer-like.
    pub fn from_declared(declared: &str) -> Self {
        match declared.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => KeyType::Integer,
            _ => KeyType::String,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, KeyType::Integer)
    }
}

/// Table, key and paging defaults of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub table: String,
    pub key_name: String,
    pub key_type: KeyType,
    /// Page size used when a request does not specify one
    pub per_page: u64,
}

impl ModelMeta {
    pub const DEFAULT_PER_PAGE: u64 = 15;

    pub fn new(table: impl Into<String>, key_name: impl Into<String>, key_type: KeyType) -> Self {
        Self {
            table: table.into(),
            key_name: key_name.into(),
            key_type,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }

    pub fn with_per_page(mut self, per_page: u64) -> Self {
        self.per_page = per_page;
        self
    }

    /// `table.key`
    pub fn qualified_key(&self) -> String {
        format!("{}.{}", self.table, self.key_name)
    }
}

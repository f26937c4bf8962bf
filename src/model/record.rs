// File: ./src/model/record.rs
// Catalog records as handed over by the data-access layer.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque product fields (price, stock quantity, ...). Passed through unchanged.
pub type Payload = Map<String, Value>;

/// Reduces a product name to the key used for ordering and equality in the index.
///
/// Case-folds and trims. Both index construction and lookups go through this,
/// the index itself never re-normalizes.
pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One document as returned by a bulk fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Payload,
}

impl SourceRecord {
    pub fn new(id: impl Into<String>, fields: Payload) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Derives the catalog record from this document, using `name_field` as the key source.
    /// Returns `None` when the field is absent or not a string.
    pub fn to_catalog_record(&self, name_field: &str) -> Option<CatalogRecord> {
        let name = self.fields.get(name_field)?.as_str()?;
        Some(CatalogRecord::new(name, self.fields.clone()))
    }
}

/// One product, keyed by its normalized name.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    pub key: String,
    pub payload: Payload,
}

impl CatalogRecord {
    pub fn new(name: &str, payload: Payload) -> Self {
        Self {
            key: normalize_key(name),
            payload,
        }
    }
}

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::CollectionId;

/// A logical grouping of items, such as one calendar or one address book.
///
/// `id` is `None` until an engine persists the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Option<CollectionId>,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub extended: BTreeMap<String, Value>,
}

impl Collection {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

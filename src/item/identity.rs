use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Engine-unique identifier of a stored item.
///
/// Issued by an engine and immutable afterwards. Equality is structural: two
/// ids are the same item exactly when both the engine scope and the local id
/// match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId {
    scope: String,
    local: u64,
}

impl ItemId {
    pub fn new(scope: impl Into<String>, local: u64) -> Self {
        Self {
            scope: scope.into(),
            local,
        }
    }

    /// Scope of the issuing engine instance.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Engine-local numeric id.
    pub fn local_id(&self) -> u64 {
        self.local
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:item:{}", self.scope, self.local)
    }
}

/// Engine-unique identifier of a collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CollectionId {
    scope: String,
    local: u64,
}

impl CollectionId {
    pub fn new(scope: impl Into<String>, local: u64) -> Self {
        Self {
            scope: scope.into(),
            local,
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn local_id(&self) -> u64 {
        self.local
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:collection:{}", self.scope, self.local)
    }
}

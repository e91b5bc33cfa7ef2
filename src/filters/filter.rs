use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::CollectionId;
use crate::DetailKind;

/// Predicate describing which items an operation selects.
///
/// A filter is immutable once built and carries no behavior of its own:
/// evaluating one against an item is the engine's job, and must be
/// deterministic and pure. The variants compose recursively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Matches every item
    Default,
    /// Matches items belonging to a set of collections
    Collection(CollectionFilter),
    /// Matches items whose detail equals a value
    Detail(DetailFilter),
    /// Matches items every sub-filter matches
    Intersection(Vec<Filter>),
    /// Matches items any sub-filter matches
    Union(Vec<Filter>),
    /// Matches items the sub-filter does not match
    Not(Box<Filter>),
}

impl Default for Filter {
    fn default() -> Self {
        Filter::Default
    }
}

/// Discriminant of [`Filter`], reported by engine capability queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    Default,
    Collection,
    Detail,
    Intersection,
    Union,
    Not,
}

impl Filter {
    pub fn kind(&self) -> FilterKind {
        match self {
            Filter::Default => FilterKind::Default,
            Filter::Collection(_) => FilterKind::Collection,
            Filter::Detail(_) => FilterKind::Detail,
            Filter::Intersection(_) => FilterKind::Intersection,
            Filter::Union(_) => FilterKind::Union,
            Filter::Not(_) => FilterKind::Not,
        }
    }

    /// Conjunction of `self` and `other`. Existing intersections are extended
    /// rather than nested.
    pub fn and(self, other: Filter) -> Filter {
        match self {
            Filter::Intersection(mut subs) => {
                subs.push(other);
                Filter::Intersection(subs)
            }
            first => Filter::Intersection(vec![first, other]),
        }
    }

    /// Disjunction of `self` and `other`. Existing unions are extended rather
    /// than nested.
    pub fn or(self, other: Filter) -> Filter {
        match self {
            Filter::Union(mut subs) => {
                subs.push(other);
                Filter::Union(subs)
            }
            first => Filter::Union(vec![first, other]),
        }
    }

    pub fn negated(self) -> Filter {
        Filter::Not(Box::new(self))
    }
}

impl From<CollectionFilter> for Filter {
    fn from(filter: CollectionFilter) -> Self {
        Filter::Collection(filter)
    }
}

impl From<DetailFilter> for Filter {
    fn from(filter: DetailFilter) -> Self {
        Filter::Detail(filter)
    }
}

/// Selects items by the collections they belong to.
///
/// Holds a set: duplicates collapse and insertion order is irrelevant. An
/// empty set matches nothing, never "everything".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionFilter {
    collection_ids: BTreeSet<CollectionId>,
}

impl CollectionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held set with the singleton `{id}`.
    pub fn set_collection_id(&mut self, id: CollectionId) {
        self.collection_ids.clear();
        self.collection_ids.insert(id);
    }

    /// Replaces the held set wholesale.
    pub fn set_collection_ids(&mut self, ids: impl IntoIterator<Item = CollectionId>) {
        self.collection_ids = ids.into_iter().collect();
    }

    /// The current set, as an independent copy. Mutating the returned set
    /// never affects the filter.
    pub fn collection_ids(&self) -> BTreeSet<CollectionId> {
        self.collection_ids.clone()
    }

    /// Membership test used by engine evaluation.
    pub fn contains(&self, id: &CollectionId) -> bool {
        self.collection_ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.collection_ids.is_empty()
    }
}

/// Selects items whose detail of `kind` projects to exactly `value`.
///
/// `field` names an extended-detail entry and is ignored for typed details.
/// Items missing the detail never match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailFilter {
    pub kind: DetailKind,
    pub field: Option<String>,
    pub value: Value,
}

impl DetailFilter {
    pub fn new(kind: DetailKind, value: impl Into<Value>) -> Self {
        Self {
            kind,
            field: None,
            value: value.into(),
        }
    }

    pub fn extended(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            kind: DetailKind::ExtendedDetail,
            field: Some(field.into()),
            value: value.into(),
        }
    }
}

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::CollectionId;
use super::DetailKind;
use super::ItemId;
use super::ParentLink;
use super::Priority;
use super::Recurrence;
use super::TimeRange;

/// Classification of an organizer item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Event,
    EventOccurrence,
    Todo,
    TodoOccurrence,
    Journal,
    Note,
}

impl ItemKind {
    /// True for the two occurrence kinds, which must carry a parent link.
    pub fn is_occurrence(&self) -> bool {
        matches!(self, ItemKind::EventOccurrence | ItemKind::TodoOccurrence)
    }

    /// The occurrence kind generated when an item of this kind recurs.
    pub fn occurrence_kind(&self) -> Option<ItemKind> {
        match self {
            ItemKind::Event => Some(ItemKind::EventOccurrence),
            ItemKind::Todo => Some(ItemKind::TodoOccurrence),
            _ => None,
        }
    }
}

impl Default for ItemKind {
    fn default() -> Self {
        ItemKind::Event
    }
}

/// One organizer item: an event, todo, journal entry, note, or a single
/// occurrence of a recurring item.
///
/// An item is a plain owned value. `id` is `None` until an engine persists the
/// item and assigns one; generated (non-persisted) occurrences keep `None`
/// forever. Typed details are individually optional; anything outside the
/// typed set lives in the `extended` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<ItemId>,
    pub collection_id: Option<CollectionId>,
    pub kind: ItemKind,
    pub display_label: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub comments: Vec<String>,
    pub tags: Vec<String>,
    pub time_range: Option<TimeRange>,
    pub recurrence: Option<Recurrence>,
    pub priority: Option<Priority>,
    pub parent: Option<ParentLink>,
    pub extended: BTreeMap<String, Value>,
}

impl Item {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Chronological anchor used for ordering and window checks.
    pub fn start_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.time_range.and_then(|r| r.start)
    }

    pub fn end_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.time_range.and_then(|r| r.end)
    }

    /// The detail categories this item currently carries a value for.
    pub fn detail_kinds(&self) -> BTreeSet<DetailKind> {
        let mut kinds = BTreeSet::new();
        if self.display_label.is_some() {
            kinds.insert(DetailKind::DisplayLabel);
        }
        if self.description.is_some() {
            kinds.insert(DetailKind::Description);
        }
        if self.location.is_some() {
            kinds.insert(DetailKind::Location);
        }
        if !self.comments.is_empty() {
            kinds.insert(DetailKind::Comment);
        }
        if !self.tags.is_empty() {
            kinds.insert(DetailKind::Tag);
        }
        if self.time_range.is_some() {
            kinds.insert(DetailKind::EventTime);
        }
        if self.recurrence.is_some() {
            kinds.insert(DetailKind::Recurrence);
        }
        if self.priority.is_some() {
            kinds.insert(DetailKind::Priority);
        }
        if self.parent.is_some() {
            kinds.insert(DetailKind::Parent);
        }
        if !self.extended.is_empty() {
            kinds.insert(DetailKind::ExtendedDetail);
        }
        kinds
    }

    /// Canonical JSON projection of one detail, used by detail filters.
    ///
    /// `field` selects an entry of the `extended` map and is ignored for every
    /// other kind. Returns `None` when the detail is absent.
    pub fn detail_value(&self, kind: DetailKind, field: Option<&str>) -> Option<Value> {
        match kind {
            DetailKind::DisplayLabel => self.display_label.clone().map(Value::from),
            DetailKind::Description => self.description.clone().map(Value::from),
            DetailKind::Location => self.location.clone().map(Value::from),
            DetailKind::Comment => (!self.comments.is_empty())
                .then(|| Value::from(self.comments.clone())),
            DetailKind::Tag => (!self.tags.is_empty()).then(|| Value::from(self.tags.clone())),
            DetailKind::EventTime => self
                .time_range
                .as_ref()
                .and_then(|r| serde_json::to_value(r).ok()),
            DetailKind::Recurrence => self
                .recurrence
                .as_ref()
                .and_then(|r| serde_json::to_value(r).ok()),
            DetailKind::Priority => self
                .priority
                .as_ref()
                .and_then(|p| serde_json::to_value(p).ok()),
            DetailKind::Parent => self
                .parent
                .as_ref()
                .and_then(|p| serde_json::to_value(p).ok()),
            DetailKind::ExtendedDetail => field.and_then(|f| self.extended.get(f).cloned()),
        }
    }

    /// Copies the details named by `mask` from `src` onto `self`, leaving
    /// every other detail untouched. An empty mask copies nothing.
    pub fn merge_masked(&mut self, src: &Item, mask: &BTreeSet<DetailKind>) {
        for kind in mask {
            match kind {
                DetailKind::DisplayLabel => self.display_label = src.display_label.clone(),
                DetailKind::Description => self.description = src.description.clone(),
                DetailKind::Location => self.location = src.location.clone(),
                DetailKind::Comment => self.comments = src.comments.clone(),
                DetailKind::Tag => self.tags = src.tags.clone(),
                DetailKind::EventTime => self.time_range = src.time_range,
                DetailKind::Recurrence => self.recurrence = src.recurrence,
                DetailKind::Priority => self.priority = src.priority,
                DetailKind::Parent => self.parent = src.parent.clone(),
                DetailKind::ExtendedDetail => self.extended = src.extended.clone(),
            }
        }
    }

    /// Drops every detail not named in `keep`. Identity, collection and kind
    /// are structural and always survive.
    pub fn strip_details(&mut self, keep: &BTreeSet<DetailKind>) {
        if !keep.contains(&DetailKind::DisplayLabel) {
            self.display_label = None;
        }
        if !keep.contains(&DetailKind::Description) {
            self.description = None;
        }
        if !keep.contains(&DetailKind::Location) {
            self.location = None;
        }
        if !keep.contains(&DetailKind::Comment) {
            self.comments.clear();
        }
        if !keep.contains(&DetailKind::Tag) {
            self.tags.clear();
        }
        if !keep.contains(&DetailKind::EventTime) {
            self.time_range = None;
        }
        if !keep.contains(&DetailKind::Recurrence) {
            self.recurrence = None;
        }
        if !keep.contains(&DetailKind::Priority) {
            self.priority = None;
        }
        if !keep.contains(&DetailKind::Parent) {
            self.parent = None;
        }
        if !keep.contains(&DetailKind::ExtendedDetail) {
            self.extended.clear();
        }
    }
}

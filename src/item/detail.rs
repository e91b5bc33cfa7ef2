use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ItemId;

/// Detail categories an item may carry.
///
/// Used three ways: as the restriction set of a [`FetchHint`](crate::FetchHint),
/// as the save mask for partial updates, and as the change-scope hint delivered
/// to item watchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DetailKind {
    DisplayLabel,
    Description,
    Location,
    Comment,
    Tag,
    EventTime,
    Recurrence,
    Priority,
    Parent,
    ExtendedDetail,
}

/// Start/end window of an event or occurrence.
///
/// Either side may be absent for open-ended items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// A closed range spanning `start..=end`.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// How often a recurring item repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Bound on a recurrence series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrenceLimit {
    /// Total number of instances, counting the first one
    Count(u32),
    /// No instance starts after this point
    Until(DateTime<Utc>),
}

/// Minimal recurrence rule an engine expands into occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    /// Step between instances in units of `frequency`; must be at least 1
    pub interval: u32,
    /// Unbounded series when absent
    pub limit: Option<RecurrenceLimit>,
}

impl Recurrence {
    pub fn every(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            limit: None,
        }
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_limit(mut self, limit: RecurrenceLimit) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Importance of a todo or event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Highest,
    High,
    Medium,
    Low,
    Lowest,
}

/// Link from an occurrence back to its recurring parent.
///
/// `original_date` is the instance date the parent's rule generated; it stays
/// fixed even when the occurrence itself is rescheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    pub parent_id: ItemId,
    pub original_date: DateTime<Utc>,
}

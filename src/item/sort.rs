use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;

use super::Item;

/// Detail an item sequence can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKind {
    StartTime,
    DisplayLabel,
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One ordering criterion for item fetches. Criteria are applied in sequence;
/// later ones break ties left by earlier ones. Items missing the sorted
/// detail always order after items that carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub kind: SortKind,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn ascending(kind: SortKind) -> Self {
        Self {
            kind,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(kind: SortKind) -> Self {
        Self {
            kind,
            direction: SortDirection::Descending,
        }
    }
}

/// Compares two items under a criteria sequence.
///
/// With no criteria this is chronological order by start time, the default
/// presentation order for organizer data.
pub fn compare_items(a: &Item, b: &Item, sorting: &[SortOrder]) -> Ordering {
    if sorting.is_empty() {
        return compare_detail(a.start_time(), b.start_time(), SortDirection::Ascending);
    }
    for order in sorting {
        let ordering = match order.kind {
            SortKind::StartTime => compare_detail(a.start_time(), b.start_time(), order.direction),
            SortKind::DisplayLabel => compare_detail(
                a.display_label.as_ref(),
                b.display_label.as_ref(),
                order.direction,
            ),
            SortKind::Priority => compare_detail(a.priority, b.priority, order.direction),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

// None sorts last regardless of direction, so absent details never float to
// the top of a descending sort.
fn compare_detail<T: Ord>(a: Option<T>, b: Option<T>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Ascending => a.cmp(&b),
            SortDirection::Descending => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

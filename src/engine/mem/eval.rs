//! Pure evaluation helpers of the in-memory engine: filter matching, time
//! windowing and recurrence expansion. Everything here is deterministic and
//! side-effect-free.

use chrono::DateTime;
use chrono::Duration;
use chrono::Months;
use chrono::Utc;

use crate::Filter;
use crate::Frequency;
use crate::Item;
use crate::ItemKind;
use crate::ParentLink;
use crate::RecurrenceLimit;
use crate::TimeRange;

/// Evaluates `filter` against one item.
pub(crate) fn filter_matches(item: &Item, filter: &Filter) -> bool {
    match filter {
        Filter::Default => true,
        Filter::Collection(cf) => match &item.collection_id {
            // An empty collection set matches nothing, so `contains` on it
            // is already the right answer.
            Some(id) => cf.contains(id),
            None => false,
        },
        Filter::Detail(df) => item
            .detail_value(df.kind, df.field.as_deref())
            .map_or(false, |value| value == df.value),
        Filter::Intersection(subs) => subs.iter().all(|f| filter_matches(item, f)),
        Filter::Union(subs) => subs.iter().any(|f| filter_matches(item, f)),
        Filter::Not(sub) => !filter_matches(item, sub),
    }
}

/// Whether an item's time range intersects the window.
///
/// Open edges are unbounded; a fully open window passes everything. Undated
/// items pass only the fully open window, since they cannot deterministically
/// intersect a bounded one.
pub(crate) fn in_window(item: &Item, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    let Some(item_start) = item.start_time() else {
        return false;
    };
    let item_end = item.end_time().unwrap_or(item_start);
    if let Some(window_start) = start {
        if item_end < window_start {
            return false;
        }
    }
    if let Some(window_end) = end {
        if item_start > window_end {
            return false;
        }
    }
    true
}

/// Expands a recurring parent into its occurrences within the window.
///
/// `exceptions` are the persisted occurrence records of this parent. Each one
/// replaces the generated instance at its original date, and a rescheduled
/// exception appears at its own time. The output is chronological, persisted
/// records ordering before generated ones at equal starts, and never exceeds
/// `cap` entries.
pub(crate) fn expand_occurrences(
    parent: &Item,
    exceptions: &[Item],
    window_start: Option<DateTime<Utc>>,
    window_end: Option<DateTime<Utc>>,
    cap: usize,
) -> Vec<Item> {
    let Some(rule) = parent.recurrence else {
        return Vec::new();
    };
    let Some(series_start) = parent.start_time() else {
        return Vec::new();
    };
    let Some(parent_id) = parent.id.clone() else {
        return Vec::new();
    };
    let interval = rule.interval.max(1);
    let duration = match (parent.start_time(), parent.end_time()) {
        (Some(s), Some(e)) if e >= s => Some(e - s),
        _ => None,
    };

    let claimed: Vec<DateTime<Utc>> = exceptions
        .iter()
        .filter_map(|e| e.parent.as_ref().map(|link| link.original_date))
        .collect();

    let mut occurrences: Vec<Item> = exceptions
        .iter()
        .filter(|e| in_window(e, window_start, window_end))
        .cloned()
        .collect();

    let mut generated = 0usize;
    for slot in 0u32.. {
        if let Some(RecurrenceLimit::Count(n)) = rule.limit {
            if slot >= n {
                break;
            }
        }
        let Some(steps) = slot.checked_mul(interval) else {
            break;
        };
        let Some(instance_date) = advance(series_start, rule.frequency, steps) else {
            break;
        };
        if let Some(RecurrenceLimit::Until(until)) = rule.limit {
            if instance_date > until {
                break;
            }
        }
        if let Some(window_end) = window_end {
            if instance_date > window_end {
                break;
            }
        }
        if generated >= cap {
            break;
        }
        // An exception owns this slot; it was already collected above.
        if claimed.contains(&instance_date) {
            continue;
        }
        let instance = generate_instance(parent, &parent_id, instance_date, duration);
        if in_window(&instance, window_start, window_end) {
            occurrences.push(instance);
            generated += 1;
        }
    }

    // Chronological; persisted exceptions (id set) before generated at ties.
    occurrences.sort_by_key(|occ| (occ.start_time(), occ.id.is_none()));
    occurrences.truncate(cap);
    occurrences
}

fn generate_instance(
    parent: &Item,
    parent_id: &crate::ItemId,
    instance_date: DateTime<Utc>,
    duration: Option<Duration>,
) -> Item {
    let kind = parent
        .kind
        .occurrence_kind()
        .unwrap_or(ItemKind::EventOccurrence);
    let mut occurrence = Item::new(kind);
    occurrence.collection_id = parent.collection_id.clone();
    occurrence.display_label = parent.display_label.clone();
    occurrence.description = parent.description.clone();
    occurrence.location = parent.location.clone();
    occurrence.comments = parent.comments.clone();
    occurrence.tags = parent.tags.clone();
    occurrence.priority = parent.priority;
    occurrence.time_range = Some(TimeRange {
        start: Some(instance_date),
        end: duration.map(|d| instance_date + d),
    });
    occurrence.parent = Some(ParentLink {
        parent_id: parent_id.clone(),
        original_date: instance_date,
    });
    occurrence
}

fn advance(start: DateTime<Utc>, frequency: Frequency, steps: u32) -> Option<DateTime<Utc>> {
    match frequency {
        Frequency::Daily => start.checked_add_signed(Duration::days(i64::from(steps))),
        Frequency::Weekly => start.checked_add_signed(Duration::days(7 * i64::from(steps))),
        Frequency::Monthly => start.checked_add_months(Months::new(steps)),
        Frequency::Yearly => steps
            .checked_mul(12)
            .and_then(|months| start.checked_add_months(Months::new(months))),
    }
}

use std::time::Duration;

use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use pimkit::Frequency;
use pimkit::Item;
use pimkit::ItemKind;
use pimkit::ParentLink;
use pimkit::Recurrence;
use pimkit::TimeRange;

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

/// One-hour event starting at `start`.
pub fn event(label: &str, start: DateTime<Utc>) -> Item {
    let mut item = Item::new(ItemKind::Event);
    item.display_label = Some(label.to_string());
    item.time_range = Some(TimeRange::between(start, start + chrono::Duration::hours(1)));
    item
}

/// Unbounded daily series starting at `start`.
pub fn daily_event(label: &str, start: DateTime<Utc>) -> Item {
    let mut item = event(label, start);
    item.recurrence = Some(Recurrence::every(Frequency::Daily));
    item
}

/// Exception record rescheduling the instance of `parent` that would have
/// started at `original` to `new_start`.
pub fn exception_of(parent: &Item, original: DateTime<Utc>, new_start: DateTime<Utc>) -> Item {
    let mut item = Item::new(ItemKind::EventOccurrence);
    item.display_label = parent.display_label.clone();
    item.time_range = Some(TimeRange::between(
        new_start,
        new_start + chrono::Duration::hours(1),
    ));
    item.parent = Some(ParentLink {
        parent_id: parent.id.clone().expect("parent must be saved first"),
        original_date: original,
    });
    item
}

/// Polls `condition` until it holds or a few seconds pass.
pub async fn eventually(what: &str, condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

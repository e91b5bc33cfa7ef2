use std::collections::BTreeSet;

use serde_json::json;

use super::*;
use crate::CollectionId;
use crate::DetailKind;

fn cid(local: u64) -> CollectionId {
    CollectionId::new("mem", local)
}

#[test]
fn test_set_collection_ids_round_trips_and_copies() {
    let wanted = BTreeSet::from([cid(1), cid(2), cid(3)]);

    let mut filter = CollectionFilter::new();
    filter.set_collection_ids(wanted.clone());
    assert_eq!(filter.collection_ids(), wanted);

    // The returned set is an independent copy.
    let mut copy = filter.collection_ids();
    copy.insert(cid(99));
    assert_eq!(filter.collection_ids(), wanted);
}

#[test]
fn test_duplicates_collapse() {
    let mut filter = CollectionFilter::new();
    filter.set_collection_ids([cid(5), cid(5), cid(5)]);

    assert_eq!(filter.collection_ids(), BTreeSet::from([cid(5)]));
}

#[test]
fn test_set_single_id_discards_previous_set() {
    let mut filter = CollectionFilter::new();
    filter.set_collection_ids([cid(1), cid(2), cid(3)]);

    filter.set_collection_id(cid(9));

    assert_eq!(filter.collection_ids(), BTreeSet::from([cid(9)]));
}

#[test]
fn test_empty_set_is_observable() {
    let filter = CollectionFilter::new();
    assert!(filter.is_empty());
    assert!(!filter.contains(&cid(1)));
}

#[test]
fn test_and_flattens_intersections() {
    let a = Filter::from(DetailFilter::new(DetailKind::DisplayLabel, "x"));
    let b = Filter::from(DetailFilter::new(DetailKind::Location, "y"));
    let c = Filter::Default;

    let combined = a.clone().and(b.clone()).and(c.clone());

    match combined {
        Filter::Intersection(subs) => assert_eq!(subs, vec![a, b, c]),
        other => panic!("expected intersection, got {other:?}"),
    }
}

#[test]
fn test_or_flattens_unions() {
    let a = Filter::from(DetailFilter::new(DetailKind::DisplayLabel, "x"));
    let b = Filter::Default;

    let combined = a.clone().or(b.clone());

    match combined {
        Filter::Union(subs) => assert_eq!(subs, vec![a, b]),
        other => panic!("expected union, got {other:?}"),
    }
}

#[test]
fn test_kind_discriminants() {
    assert_eq!(Filter::Default.kind(), FilterKind::Default);
    assert_eq!(
        Filter::from(CollectionFilter::new()).kind(),
        FilterKind::Collection
    );
    assert_eq!(Filter::Default.negated().kind(), FilterKind::Not);
}

#[test]
fn test_extended_detail_filter_carries_field() {
    let filter = DetailFilter::extended("color", json!("red"));
    assert_eq!(filter.kind, DetailKind::ExtendedDetail);
    assert_eq!(filter.field.as_deref(), Some("color"));
    assert_eq!(filter.value, json!("red"));
}

//! Tests for overlap and back-to-back detection.

use chrono::NaiveDate;

use super::{annotate, back_to_back, overlaps};
use crate::db::ScheduleEntry;

fn entry(id: &str, owner: &str, day: u32, start: &str, end: &str) -> ScheduleEntry {
    ScheduleEntry {
        id: id.to_string(),
        owner_id: owner.to_string(),
        title: format!("Event {id}"),
        description: None,
        location: None,
        date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
        start_time: start.parse().unwrap(),
        end_time: end.parse().unwrap(),
        external_source_id: None,
        external_uid: None,
        last_synced_at: None,
        created_at: "2025-01-01 00:00:00".to_string(),
    }
}

#[test]
fn fifteen_minute_gap_is_back_to_back_not_overlap() {
    let a = entry("a", "alice", 10, "09:00", "10:00");
    let b = entry("b", "alice", 10, "10:15", "11:00");

    assert!(!overlaps(&a, &b));
    assert!(back_to_back(&a, &b));
    assert!(back_to_back(&b, &a));
}

#[test]
fn intersecting_intervals_overlap_for_any_owner() {
    let a = entry("a", "alice", 10, "09:00", "10:00");
    let same_owner = entry("b", "alice", 10, "09:30", "10:30");
    let other_owner = entry("c", "bob", 10, "09:30", "10:30");

    assert!(overlaps(&a, &same_owner));
    assert!(overlaps(&a, &other_owner));
    assert!(!back_to_back(&a, &same_owner));
    assert!(!back_to_back(&same_owner, &a));
    assert!(!back_to_back(&a, &other_owner));
}

#[test]
fn thirty_one_minute_gap_is_neither() {
    let a = entry("a", "alice", 10, "09:00", "10:00");
    let b = entry("b", "alice", 10, "10:31", "11:00");

    assert!(!overlaps(&a, &b));
    assert!(!back_to_back(&a, &b));
}

#[test]
fn thirty_minute_gap_is_inclusive() {
    let a = entry("a", "alice", 10, "09:00", "10:00");
    let b = entry("b", "alice", 10, "10:30", "11:00");

    assert!(back_to_back(&a, &b));
}

#[test]
fn touching_intervals_do_not_overlap() {
    let a = entry("a", "alice", 10, "09:00", "10:00");
    let b = entry("b", "alice", 10, "10:00", "11:00");

    assert!(!overlaps(&a, &b));
    assert!(back_to_back(&a, &b));
}

#[test]
fn back_to_back_requires_same_owner() {
    let a = entry("a", "alice", 10, "09:00", "10:00");
    let b = entry("b", "bob", 10, "10:10", "11:00");

    assert!(!back_to_back(&a, &b));
}

#[test]
fn different_dates_never_relate() {
    let a = entry("a", "alice", 10, "09:00", "10:00");
    let b = entry("b", "alice", 11, "09:30", "10:30");
    let c = entry("c", "alice", 11, "10:05", "11:00");

    assert!(!overlaps(&a, &b));
    assert!(!back_to_back(&a, &c));
}

#[test]
fn overlap_is_symmetric() {
    let times = [
        ("08:00", "09:00"),
        ("08:30", "09:30"),
        ("09:00", "10:00"),
        ("07:00", "12:00"),
        ("09:15", "09:45"),
        ("11:00", "11:30"),
    ];

    for (i, (s1, e1)) in times.iter().enumerate() {
        for (j, (s2, e2)) in times.iter().enumerate() {
            let a = entry(&format!("a{i}"), "alice", 10, s1, e1);
            let b = entry(&format!("b{j}"), "bob", 10, s2, e2);
            assert_eq!(overlaps(&a, &b), overlaps(&b, &a), "{s1}-{e1} vs {s2}-{e2}");
        }
    }
}

#[test]
fn annotate_flags_each_entry_and_preserves_order() {
    let entries = vec![
        entry("school", "kid", 10, "08:30", "12:00"),
        entry("dentist", "mum", 10, "11:30", "12:15"),
        entry("swim", "kid", 10, "12:20", "13:00"),
        entry("work", "dad", 10, "14:00", "18:00"),
    ];

    let annotated = annotate(&entries);
    let flags: Vec<(&str, bool, bool)> = annotated
        .iter()
        .map(|a| (a.entry.id.as_str(), a.has_overlap, a.has_back_to_back))
        .collect();

    assert_eq!(
        flags,
        vec![
            ("school", true, false),
            ("dentist", true, false),
            ("swim", false, true),
            ("work", false, false),
        ]
    );
}

#[test]
fn overlap_takes_precedence_over_back_to_back() {
    let entries = vec![
        entry("a", "alice", 10, "09:00", "10:00"),
        entry("b", "alice", 10, "10:10", "11:00"),
        entry("c", "bob", 10, "09:30", "09:45"),
    ];

    let annotated = annotate(&entries);
    assert!(annotated[0].has_overlap);
    assert!(!annotated[0].has_back_to_back);
    assert!(!annotated[1].has_overlap);
    assert!(annotated[1].has_back_to_back);
}

#[test]
fn annotate_leaves_input_untouched_and_is_deterministic() {
    let entries = vec![
        entry("a", "alice", 10, "09:00", "10:00"),
        entry("b", "alice", 10, "10:15", "11:00"),
    ];
    let before = entries.clone();

    let first = annotate(&entries);
    let second = annotate(&entries);

    assert_eq!(entries, before);
    assert_eq!(first, second);
}

#[test]
fn annotate_single_entry_has_no_flags() {
    let annotated = annotate(&[entry("a", "alice", 10, "09:00", "10:00")]);
    assert!(!annotated[0].has_overlap);
    assert!(!annotated[0].has_back_to_back);
    assert!(annotate(&[]).is_empty());
}

#[test]
fn annotated_entry_serializes_flat() {
    let annotated = annotate(&[entry("a", "alice", 10, "09:00", "10:00")]);
    let json = serde_json::to_value(&annotated[0]).unwrap();
    assert_eq!(json["id"], "a");
    assert_eq!(json["start_time"], "09:00");
    assert_eq!(json["has_overlap"], false);
}

use chrono::{TimeZone, Utc};
use timecard_backend::models::day_off::DayOffRequest;
use timecard_backend::models::request::{Decision, RequestStatus};
use timecard_backend::models::timesheet::{EntryType, TimesheetEntry};
use timecard_backend::types::{ProjectId, UserId};

#[test]
fn lifecycle_new_records_start_pending() {
    let entry = TimesheetEntry::new(
        UserId::new(),
        ProjectId::new(),
        "refactor".to_string(),
        None,
        chrono::NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        60,
        EntryType::Normal,
        Utc::now(),
    );
    assert_eq!(entry.status, RequestStatus::Pending);
    assert!(entry.is_pending());

    let request = DayOffRequest::new(
        UserId::new(),
        "vacation".to_string(),
        None,
        Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
        Utc::now(),
    );
    assert_eq!(request.status, RequestStatus::Pending);
    assert!(request.is_pending());
}

#[test]
fn lifecycle_only_pending_is_non_terminal() {
    assert!(!RequestStatus::Pending.is_terminal());
    assert!(RequestStatus::Approved.is_terminal());
    assert!(RequestStatus::Rejected.is_terminal());
}

#[test]
fn lifecycle_decisions_target_only_terminal_states() {
    assert!(Decision::Approved.target_status().is_terminal());
    assert!(Decision::Rejected.target_status().is_terminal());
}

#[test]
fn lifecycle_status_round_trips_through_db_values() {
    for status in [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Rejected,
    ] {
        let value = status.db_value();
        let parsed: RequestStatus = serde_json::from_str(&format!("\"{}\"", value)).unwrap();
        assert_eq!(parsed, status);
    }
}

#[test]
fn overlap_predicate_matches_the_interval_invariant() {
    let request = DayOffRequest::new(
        UserId::new(),
        "morning off".to_string(),
        None,
        Utc.with_ymd_and_hms(2024, 6, 10, 10, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
        Utc::now(),
    );

    // existing.start < new.end AND existing.end > new.start
    let cases = [
        (11, 13, true),  // overlaps the tail
        (9, 11, true),   // overlaps the head
        (10, 12, true),  // identical
        (12, 14, false), // touches at the end boundary
        (8, 10, false),  // touches at the start boundary
        (13, 15, false), // disjoint
    ];
    for (start_hour, end_hour, expected) in cases {
        let start = Utc.with_ymd_and_hms(2024, 6, 10, start_hour, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 10, end_hour, 0, 0).unwrap();
        assert_eq!(
            request.overlaps(start, end),
            expected,
            "[{}, {}) against [10, 12)",
            start_hour,
            end_hour
        );
    }
}

use chrono::{TimeZone, Utc};
use timecard_backend::models::day_off::CreateDayOffRequest;
use timecard_backend::models::timesheet::{CreateTimesheetRequest, EntryType};
use timecard_backend::types::ProjectId;
use validator::Validate;

fn timesheet_payload(minutes: i32, title: &str) -> CreateTimesheetRequest {
    CreateTimesheetRequest {
        project_id: ProjectId::new(),
        title: title.to_string(),
        description: None,
        working_date: None,
        minutes,
        entry_type: EntryType::Normal,
    }
}

#[test]
fn timesheet_payload_accepts_reasonable_values() {
    assert!(timesheet_payload(450, "sprint work").validate().is_ok());
}

#[test]
fn timesheet_payload_rejects_non_positive_minutes() {
    assert!(timesheet_payload(0, "sprint work").validate().is_err());
    assert!(timesheet_payload(-30, "sprint work").validate().is_err());
}

#[test]
fn timesheet_payload_rejects_more_than_a_day() {
    assert!(timesheet_payload(1441, "sprint work").validate().is_err());
}

#[test]
fn timesheet_payload_rejects_blank_title() {
    assert!(timesheet_payload(60, "   ").validate().is_err());
}

#[test]
fn day_off_payload_validates_title_only() {
    // Interval sanity is the engine's concern, not the payload's.
    let payload = CreateDayOffRequest {
        title: "vacation".to_string(),
        reason: Some("family visit".to_string()),
        start_at: Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap(),
        end_at: Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
    };
    assert!(payload.validate().is_ok());

    let blank = CreateDayOffRequest {
        title: "".to_string(),
        ..payload
    };
    assert!(blank.validate().is_err());
}

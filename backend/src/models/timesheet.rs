use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::request::RequestStatus;
use crate::types::{ProjectId, TimesheetEntryId, UserId};
use crate::validation::rules::validate_title;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimesheetEntry {
    pub id: TimesheetEntryId,
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    pub working_date: NaiveDate,
    /// Logged work duration in minutes.
    pub minutes: i32,
    pub entry_type: EntryType,
    pub status: RequestStatus,
    pub deleted: bool,
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kind of logged work. Only `Normal` entries count against the daily
/// capacity and are restricted to working days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    #[default]
    Normal,
    Overtime,
    Bonus,
}

impl EntryType {
    pub fn db_value(&self) -> &'static str {
        match self {
            EntryType::Normal => "normal",
            EntryType::Overtime => "overtime",
            EntryType::Bonus => "bonus",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTimesheetRequest {
    pub project_id: ProjectId,
    #[validate(custom(function = validate_title))]
    pub title: String,
    pub description: Option<String>,
    /// Defaults to today (in the configured timezone) when omitted.
    pub working_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 1440))]
    pub minutes: i32,
    #[serde(default)]
    pub entry_type: EntryType,
}

/// Partial update of a still-pending entry. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTimesheetRequest {
    #[validate(custom(function = validate_title))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub working_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 1440))]
    pub minutes: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimesheetResponse {
    pub id: TimesheetEntryId,
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    pub working_date: NaiveDate,
    pub minutes: i32,
    pub entry_type: EntryType,
    pub status: RequestStatus,
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TimesheetEntry> for TimesheetResponse {
    fn from(entry: TimesheetEntry) -> Self {
        TimesheetResponse {
            id: entry.id,
            user_id: entry.user_id,
            project_id: entry.project_id,
            title: entry.title,
            description: entry.description,
            working_date: entry.working_date,
            minutes: entry.minutes,
            entry_type: entry.entry_type,
            status: entry.status,
            decided_by: entry.decided_by,
            decided_at: entry.decided_at,
            decision_comment: entry.decision_comment,
            created_at: entry.created_at,
        }
    }
}

impl TimesheetEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        project_id: ProjectId,
        title: String,
        description: Option<String>,
        working_date: NaiveDate,
        minutes: i32,
        entry_type: EntryType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TimesheetEntryId::new(),
            user_id,
            project_id,
            title,
            description,
            working_date,
            minutes,
            entry_type,
            status: RequestStatus::Pending,
            deleted: false,
            decided_by: None,
            decided_at: None,
            decision_comment: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, RequestStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_type_serde_snake_case() {
        let kind: EntryType = serde_json::from_str("\"overtime\"").unwrap();
        assert!(matches!(kind, EntryType::Overtime));
        let value = serde_json::to_value(EntryType::Bonus).unwrap();
        assert_eq!(value, serde_json::json!("bonus"));
    }

    #[test]
    fn new_entries_start_pending_and_undeleted() {
        let entry = TimesheetEntry::new(
            UserId::new(),
            ProjectId::new(),
            "api work".to_string(),
            None,
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            120,
            EntryType::Normal,
            Utc::now(),
        );
        assert!(entry.is_pending());
        assert!(!entry.deleted);
        assert!(entry.decided_by.is_none());
    }

    #[test]
    fn create_payload_rejects_out_of_range_minutes() {
        let payload = CreateTimesheetRequest {
            project_id: ProjectId::new(),
            title: "work".to_string(),
            description: None,
            working_date: None,
            minutes: 0,
            entry_type: EntryType::Normal,
        };
        assert!(validator::Validate::validate(&payload).is_err());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::request::RequestStatus;
use crate::types::{DayOffRequestId, UserId};
use crate::validation::rules::validate_title;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DayOffRequest {
    pub id: DayOffRequestId,
    pub user_id: UserId,
    pub title: String,
    pub reason: Option<String>,
    /// Absence interval, half-open `[start_at, end_at)`.
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: RequestStatus,
    pub deleted: bool,
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDayOffRequest {
    #[validate(custom(function = validate_title))]
    pub title: String,
    pub reason: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayOffResponse {
    pub id: DayOffRequestId,
    pub user_id: UserId,
    pub title: String,
    pub reason: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: RequestStatus,
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DayOffRequest> for DayOffResponse {
    fn from(request: DayOffRequest) -> Self {
        DayOffResponse {
            id: request.id,
            user_id: request.user_id,
            title: request.title,
            reason: request.reason,
            start_at: request.start_at,
            end_at: request.end_at,
            status: request.status,
            decided_by: request.decided_by,
            decided_at: request.decided_at,
            decision_comment: request.decision_comment,
            created_at: request.created_at,
        }
    }
}

impl DayOffRequest {
    pub fn new(
        user_id: UserId,
        title: String,
        reason: Option<String>,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DayOffRequestId::new(),
            user_id,
            title,
            reason,
            start_at,
            end_at,
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

    /// The half-open overlap test against another interval.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_at < end && self.end_at > start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(start: DateTime<Utc>, end: DateTime<Utc>) -> DayOffRequest {
        DayOffRequest::new(
            UserId::new(),
            "dentist".to_string(),
            None,
            start,
            end,
            Utc::now(),
        )
    }

    #[test]
    fn new_requests_start_pending_and_undeleted() {
        let start = Utc.with_ymd_and_hms(2024, 6, 10, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let request = request(start, end);
        assert!(request.is_pending());
        assert!(!request.deleted);
    }

    #[test]
    fn overlap_test_is_half_open() {
        let start = Utc.with_ymd_and_hms(2024, 6, 10, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let request = request(start, end);

        // Touching at the boundary is not an overlap.
        assert!(!request.overlaps(end, Utc.with_ymd_and_hms(2024, 6, 10, 13, 0, 0).unwrap()));
        assert!(!request.overlaps(Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap(), start));
        // Any shared instant inside is.
        assert!(request.overlaps(
            Utc.with_ymd_and_hms(2024, 6, 10, 11, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 10, 13, 0, 0).unwrap()
        ));
    }
}

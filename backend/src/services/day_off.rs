//! Day-off request workflow: creation behind the overlap guard, and the
//! single-transition approval lifecycle.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::error::AppError;
use crate::models::day_off::{CreateDayOffRequest, DayOffRequest};
use crate::models::request::DecisionRequest;
use crate::models::user::User;
use crate::models::PaginationQuery;
use crate::repositories::DayOffRepositoryTrait;
use crate::services::work_hours::is_weekend;
use crate::types::DayOffRequestId;

#[derive(Clone)]
pub struct DayOffService {
    day_offs: Arc<dyn DayOffRepositoryTrait>,
    time_zone: Tz,
}

impl DayOffService {
    pub fn new(day_offs: Arc<dyn DayOffRepositoryTrait>, time_zone: Tz) -> Self {
        Self {
            day_offs,
            time_zone,
        }
    }

    /// Creates a day-off request for the acting user.
    ///
    /// Rejects inverted intervals, intervals touching a weekend day, and
    /// intervals overlapping any other non-deleted request of the same user.
    /// The request is stored in `Pending`.
    pub async fn create_request(
        &self,
        actor: &User,
        payload: CreateDayOffRequest,
    ) -> Result<DayOffRequest, AppError> {
        if payload.end_at <= payload.start_at {
            return Err(AppError::InvalidInterval(
                "interval end must be after its start".to_string(),
            ));
        }

        let start_local = payload.start_at.with_timezone(&self.time_zone).naive_local();
        let end_local = payload.end_at.with_timezone(&self.time_zone).naive_local();
        if let Some(weekend_day) = first_weekend_day(start_local, end_local)? {
            return Err(AppError::WeekendViolation(weekend_day));
        }

        let conflicts = self
            .day_offs
            .find_overlapping(actor.id, payload.start_at, payload.end_at, None)
            .await?;
        if let Some(conflict) = conflicts.first() {
            return Err(overlap_error(conflict));
        }

        let request = DayOffRequest::new(
            actor.id,
            payload.title,
            payload.reason,
            payload.start_at,
            payload.end_at,
            Utc::now(),
        );

        // The insert re-checks the overlap atomically; a concurrent request
        // that won the race surfaces here.
        if !self.day_offs.insert_if_free(&request).await? {
            let conflicts = self
                .day_offs
                .find_overlapping(actor.id, payload.start_at, payload.end_at, None)
                .await?;
            return match conflicts.first() {
                Some(conflict) => Err(overlap_error(conflict)),
                None => Err(AppError::InternalServerError(anyhow::anyhow!(
                    "day-off insert guard failed without a visible conflict"
                ))),
            };
        }

        Ok(request)
    }

    /// Applies an approver decision to a pending request.
    pub async fn decide_request(
        &self,
        actor: &User,
        id: DayOffRequestId,
        decision: DecisionRequest,
    ) -> Result<DayOffRequest, AppError> {
        if !actor.can_approve() {
            return Err(AppError::Forbidden(
                "Only managers may decide day-off requests".to_string(),
            ));
        }

        let rows = self
            .day_offs
            .decide(
                id,
                decision.decision.target_status(),
                actor.id,
                decision.comment,
                Utc::now(),
            )
            .await?;
        if rows == 0 {
            return match self.day_offs.find_by_id(id).await? {
                None => Err(AppError::NotFound("Day-off request not found".to_string())),
                Some(_) => Err(AppError::AlreadyProcessed("day-off request".to_string())),
            };
        }

        self.day_offs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Day-off request not found".to_string()))
    }

    /// Soft-deletes a pending request owned by the acting user.
    pub async fn delete_request(
        &self,
        actor: &User,
        id: DayOffRequestId,
    ) -> Result<(), AppError> {
        let rows = self
            .day_offs
            .soft_delete_pending(id, actor.id, Utc::now())
            .await?;
        if rows == 0 {
            return match self.day_offs.find_by_id(id).await? {
                None => Err(AppError::NotFound("Day-off request not found".to_string())),
                Some(request) if request.user_id != actor.id => {
                    Err(AppError::Forbidden("Forbidden".to_string()))
                }
                Some(_) => Err(AppError::AlreadyProcessed("day-off request".to_string())),
            };
        }
        Ok(())
    }

    /// The acting user's own requests, newest first.
    pub async fn list_for(
        &self,
        actor: &User,
        pagination: &PaginationQuery,
    ) -> Result<Vec<DayOffRequest>, AppError> {
        self.day_offs
            .find_by_user(actor.id, pagination.limit(), pagination.offset())
            .await
    }
}

fn overlap_error(conflict: &DayOffRequest) -> AppError {
    AppError::OverlapConflict {
        conflicting_id: conflict.id.to_string(),
        conflicting_title: conflict.title.clone(),
    }
}

/// First Saturday or Sunday covered by the local interval, if any.
///
/// An interval ending exactly at midnight does not cover the date it ends
/// on, so a request through Friday 24:00 never touches the Saturday.
fn first_weekend_day(
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Option<NaiveDate>, AppError> {
    let last = if end.time() == NaiveTime::MIN {
        end.date()
            .pred_opt()
            .ok_or_else(|| AppError::InvalidInterval("date underflow".to_string()))?
    } else {
        end.date()
    };

    let mut date = start.date();
    while date <= last {
        if is_weekend(date) {
            return Ok(Some(date));
        }
        date = date
            .succ_opt()
            .ok_or_else(|| AppError::InvalidInterval("date overflow".to_string()))?;
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::{Decision, RequestStatus};
    use crate::models::user::UserRole;
    use crate::repositories::day_off_repository::MockDayOffRepositoryTrait;
    use crate::types::UserId;
    use chrono::{DateTime, TimeZone};

    fn employee() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            username: "aoki".to_string(),
            display_name: "Aoki".to_string(),
            role: UserRole::Employee,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn manager() -> User {
        User {
            role: UserRole::Manager,
            ..employee()
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn payload(start: DateTime<Utc>, end: DateTime<Utc>) -> CreateDayOffRequest {
        CreateDayOffRequest {
            title: "dentist".to_string(),
            reason: None,
            start_at: start,
            end_at: end,
        }
    }

    fn stored_request(user_id: UserId, start: DateTime<Utc>, end: DateTime<Utc>) -> DayOffRequest {
        DayOffRequest::new(
            user_id,
            "summer vacation".to_string(),
            None,
            start,
            end,
            Utc::now(),
        )
    }

    fn service(mock: MockDayOffRepositoryTrait) -> DayOffService {
        DayOffService::new(Arc::new(mock), chrono_tz::UTC)
    }

    #[tokio::test]
    async fn rejects_inverted_interval_before_any_lookup() {
        let service = service(MockDayOffRepositoryTrait::new());
        let actor = employee();

        let result = service
            .create_request(
                &actor,
                payload(at(2024, 6, 10, 12, 0), at(2024, 6, 10, 9, 0)),
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidInterval(_))));
    }

    #[tokio::test]
    async fn rejects_weekend_only_request() {
        // Saturday 2024-06-08, full day.
        let service = service(MockDayOffRepositoryTrait::new());
        let actor = employee();

        let result = service
            .create_request(
                &actor,
                payload(at(2024, 6, 8, 0, 0), at(2024, 6, 9, 0, 0)),
            )
            .await;
        assert!(matches!(
            result,
            Err(AppError::WeekendViolation(date))
                if date == NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()
        ));
    }

    #[tokio::test]
    async fn rejects_span_crossing_a_weekend() {
        // Friday through Monday covers both weekend days.
        let service = service(MockDayOffRepositoryTrait::new());
        let actor = employee();

        let result = service
            .create_request(
                &actor,
                payload(at(2024, 6, 7, 9, 0), at(2024, 6, 10, 18, 0)),
            )
            .await;
        assert!(matches!(result, Err(AppError::WeekendViolation(_))));
    }

    #[tokio::test]
    async fn interval_ending_at_saturday_midnight_is_accepted() {
        let mut mock = MockDayOffRepositoryTrait::new();
        mock.expect_find_overlapping()
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));
        mock.expect_insert_if_free().times(1).returning(|_| Ok(true));

        let service = service(mock);
        let actor = employee();

        // Friday 09:00 through Saturday 00:00.
        let result = service
            .create_request(
                &actor,
                payload(at(2024, 6, 7, 9, 0), at(2024, 6, 8, 0, 0)),
            )
            .await
            .unwrap();
        assert_eq!(result.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn overlapping_request_is_rejected_with_the_conflict_named() {
        let actor = employee();
        let existing = stored_request(
            actor.id,
            at(2024, 6, 10, 10, 0),
            at(2024, 6, 10, 12, 0),
        );
        let existing_id = existing.id;

        let mut mock = MockDayOffRepositoryTrait::new();
        mock.expect_find_overlapping()
            .times(1)
            .returning(move |_, _, _, _| Ok(vec![existing.clone()]));

        let service = service(mock);
        let result = service
            .create_request(
                &actor,
                payload(at(2024, 6, 10, 11, 0), at(2024, 6, 10, 13, 0)),
            )
            .await;
        match result {
            Err(AppError::OverlapConflict {
                conflicting_id,
                conflicting_title,
            }) => {
                assert_eq!(conflicting_id, existing_id.to_string());
                assert_eq!(conflicting_title, "summer vacation");
            }
            other => panic!("expected OverlapConflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn lost_insert_race_surfaces_as_overlap_conflict() {
        let actor = employee();
        let winner = stored_request(
            actor.id,
            at(2024, 6, 10, 10, 0),
            at(2024, 6, 10, 12, 0),
        );

        let mut mock = MockDayOffRepositoryTrait::new();
        mock.expect_find_overlapping()
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));
        mock.expect_insert_if_free().times(1).returning(|_| Ok(false));
        mock.expect_find_overlapping()
            .times(1)
            .returning(move |_, _, _, _| Ok(vec![winner.clone()]));

        let service = service(mock);
        let result = service
            .create_request(
                &actor,
                payload(at(2024, 6, 10, 11, 0), at(2024, 6, 10, 13, 0)),
            )
            .await;
        assert!(matches!(result, Err(AppError::OverlapConflict { .. })));
    }

    #[tokio::test]
    async fn valid_request_is_stored_pending() {
        let mut mock = MockDayOffRepositoryTrait::new();
        mock.expect_find_overlapping()
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));
        mock.expect_insert_if_free().times(1).returning(|_| Ok(true));

        let service = service(mock);
        let actor = employee();
        let request = service
            .create_request(
                &actor,
                payload(at(2024, 6, 10, 9, 0), at(2024, 6, 10, 13, 30)),
            )
            .await
            .unwrap();
        assert_eq!(request.user_id, actor.id);
        assert!(request.is_pending());
        assert!(!request.deleted);
    }

    #[tokio::test]
    async fn employees_may_not_decide() {
        let service = service(MockDayOffRepositoryTrait::new());
        let actor = employee();

        let result = service
            .decide_request(
                &actor,
                DayOffRequestId::new(),
                DecisionRequest {
                    decision: Decision::Approved,
                    comment: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn approval_transitions_a_pending_request() {
        let actor = manager();
        let mut approved = stored_request(
            UserId::new(),
            at(2024, 6, 10, 9, 0),
            at(2024, 6, 10, 13, 30),
        );
        approved.status = RequestStatus::Approved;
        let id = approved.id;

        let mut mock = MockDayOffRepositoryTrait::new();
        mock.expect_decide().times(1).returning(|_, _, _, _, _| Ok(1));
        mock.expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(approved.clone())));

        let service = service(mock);
        let result = service
            .decide_request(
                &actor,
                id,
                DecisionRequest {
                    decision: Decision::Approved,
                    comment: Some("enjoy".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(result.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn second_decision_fails_already_processed() {
        let actor = manager();
        let mut already = stored_request(
            UserId::new(),
            at(2024, 6, 10, 9, 0),
            at(2024, 6, 10, 13, 30),
        );
        already.status = RequestStatus::Approved;
        let id = already.id;

        let mut mock = MockDayOffRepositoryTrait::new();
        mock.expect_decide().times(1).returning(|_, _, _, _, _| Ok(0));
        mock.expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(already.clone())));

        let service = service(mock);
        let result = service
            .decide_request(
                &actor,
                id,
                DecisionRequest {
                    decision: Decision::Rejected,
                    comment: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::AlreadyProcessed(_))));
    }

    #[tokio::test]
    async fn deciding_a_missing_request_fails_not_found() {
        let actor = manager();

        let mut mock = MockDayOffRepositoryTrait::new();
        mock.expect_decide().times(1).returning(|_, _, _, _, _| Ok(0));
        mock.expect_find_by_id().times(1).returning(|_| Ok(None));

        let service = service(mock);
        let result = service
            .decide_request(
                &actor,
                DayOffRequestId::new(),
                DecisionRequest {
                    decision: Decision::Approved,
                    comment: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn first_weekend_day_scans_the_covered_dates() {
        let monday = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let start = monday.and_hms_opt(9, 0, 0).unwrap();
        let end = monday.and_hms_opt(18, 0, 0).unwrap();
        assert_eq!(first_weekend_day(start, end).unwrap(), None);

        let friday = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap();
        let start = friday.and_hms_opt(9, 0, 0).unwrap();
        let end = friday
            .succ_opt()
            .unwrap()
            .and_hms_opt(0, 0, 1)
            .unwrap();
        assert_eq!(
            first_weekend_day(start, end).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 8)
        );
    }
}

//! Timesheet entry workflow: the creation validation pipeline and the
//! single-transition approval lifecycle.
//!
//! Creation runs an ordered, short-circuiting pipeline: resolve the project,
//! check membership, exclude non-working days for standard entries, then cap
//! the new duration against the day's leave-adjusted capacity. Every check
//! happens before the write; the write itself re-asserts the cap.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::AppError;
use crate::models::request::{DecisionRequest, RequestStatus};
use crate::models::timesheet::{
    CreateTimesheetRequest, EntryType, TimesheetEntry, UpdateTimesheetRequest,
};
use crate::models::user::User;
use crate::models::PaginationQuery;
use crate::repositories::{
    DayOffRepositoryTrait, HolidayRepositoryTrait, ProjectRepositoryTrait,
    TimesheetRepositoryTrait,
};
use crate::services::work_hours::{self, is_weekend, DAILY_CAPACITY_MINUTES};
use crate::types::{TimesheetEntryId, UserId};
use crate::utils::time::{local_day_bounds, today_local};

#[derive(Clone)]
pub struct TimesheetService {
    timesheets: Arc<dyn TimesheetRepositoryTrait>,
    day_offs: Arc<dyn DayOffRepositoryTrait>,
    projects: Arc<dyn ProjectRepositoryTrait>,
    holidays: Arc<dyn HolidayRepositoryTrait>,
    time_zone: Tz,
}

impl TimesheetService {
    pub fn new(
        timesheets: Arc<dyn TimesheetRepositoryTrait>,
        day_offs: Arc<dyn DayOffRepositoryTrait>,
        projects: Arc<dyn ProjectRepositoryTrait>,
        holidays: Arc<dyn HolidayRepositoryTrait>,
        time_zone: Tz,
    ) -> Self {
        Self {
            timesheets,
            day_offs,
            projects,
            holidays,
            time_zone,
        }
    }

    /// Validates and stores a new entry for the acting user.
    pub async fn create_entry(
        &self,
        actor: &User,
        payload: CreateTimesheetRequest,
    ) -> Result<TimesheetEntry, AppError> {
        let project = self
            .projects
            .find_by_id(payload.project_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
        if !self.projects.is_member(actor.id, project.id).await? {
            return Err(AppError::Forbidden("You are not in project".to_string()));
        }

        let working_date = payload
            .working_date
            .unwrap_or_else(|| today_local(&self.time_zone));

        let mut normal_cap = None;
        if payload.entry_type == EntryType::Normal {
            self.ensure_working_day(working_date).await?;

            let existing = self
                .timesheets
                .find_for_user_on(actor.id, working_date)
                .await?;
            let already_logged = normal_minutes(&existing, None);
            let max_allowed = self.leave_adjusted_cap(actor.id, working_date).await?;
            if already_logged + i64::from(payload.minutes) > max_allowed {
                return Err(AppError::CapacityExceeded {
                    max_allowed_minutes: max_allowed,
                });
            }
            normal_cap = Some(max_allowed);
        }

        let entry = TimesheetEntry::new(
            actor.id,
            project.id,
            payload.title,
            payload.description,
            working_date,
            payload.minutes,
            payload.entry_type,
            Utc::now(),
        );

        // The insert re-checks the cap atomically; a concurrent entry that
        // won the race surfaces here.
        if !self.timesheets.insert(&entry, normal_cap).await? {
            return Err(AppError::CapacityExceeded {
                max_allowed_minutes: normal_cap.unwrap_or(0),
            });
        }

        Ok(entry)
    }

    /// Edits a still-pending entry owned by the acting user, re-running the
    /// validation pipeline with the entry itself excluded from the logged sum.
    pub async fn update_entry(
        &self,
        actor: &User,
        id: TimesheetEntryId,
        payload: UpdateTimesheetRequest,
    ) -> Result<TimesheetEntry, AppError> {
        let current = self
            .timesheets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Timesheet entry not found".to_string()))?;
        if current.user_id != actor.id {
            return Err(AppError::Forbidden("Forbidden".to_string()));
        }
        if !current.is_pending() {
            return Err(AppError::AlreadyProcessed("timesheet entry".to_string()));
        }

        let mut updated = current;
        if let Some(title) = payload.title {
            updated.title = title;
        }
        if let Some(description) = payload.description {
            updated.description = Some(description);
        }
        if let Some(working_date) = payload.working_date {
            updated.working_date = working_date;
        }
        if let Some(minutes) = payload.minutes {
            updated.minutes = minutes;
        }
        updated.updated_at = Utc::now();

        let mut normal_cap = None;
        if updated.entry_type == EntryType::Normal {
            self.ensure_working_day(updated.working_date).await?;

            let existing = self
                .timesheets
                .find_for_user_on(actor.id, updated.working_date)
                .await?;
            let already_logged = normal_minutes(&existing, Some(updated.id));
            let max_allowed = self
                .leave_adjusted_cap(actor.id, updated.working_date)
                .await?;
            if already_logged + i64::from(updated.minutes) > max_allowed {
                return Err(AppError::CapacityExceeded {
                    max_allowed_minutes: max_allowed,
                });
            }
            normal_cap = Some(max_allowed);
        }

        let rows = self.timesheets.update_pending(&updated, normal_cap).await?;
        if rows == 0 {
            return match self.timesheets.find_by_id(id).await? {
                Some(entry) if !entry.is_pending() => {
                    Err(AppError::AlreadyProcessed("timesheet entry".to_string()))
                }
                Some(_) => Err(AppError::CapacityExceeded {
                    max_allowed_minutes: normal_cap.unwrap_or(0),
                }),
                None => Err(AppError::NotFound("Timesheet entry not found".to_string())),
            };
        }

        Ok(updated)
    }

    /// Applies an approver decision to a pending entry.
    pub async fn decide_entry(
        &self,
        actor: &User,
        id: TimesheetEntryId,
        decision: DecisionRequest,
    ) -> Result<TimesheetEntry, AppError> {
        if !actor.can_approve() {
            return Err(AppError::Forbidden(
                "Only managers may decide timesheet entries".to_string(),
            ));
        }

        let rows = self
            .timesheets
            .decide(
                id,
                decision.decision.target_status(),
                actor.id,
                decision.comment,
                Utc::now(),
            )
            .await?;
        if rows == 0 {
            return match self.timesheets.find_by_id(id).await? {
                None => Err(AppError::NotFound("Timesheet entry not found".to_string())),
                Some(_) => Err(AppError::AlreadyProcessed("timesheet entry".to_string())),
            };
        }

        self.timesheets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Timesheet entry not found".to_string()))
    }

    /// Soft-deletes a pending entry owned by the acting user.
    pub async fn delete_entry(
        &self,
        actor: &User,
        id: TimesheetEntryId,
    ) -> Result<(), AppError> {
        let rows = self
            .timesheets
            .soft_delete_pending(id, actor.id, Utc::now())
            .await?;
        if rows == 0 {
            return match self.timesheets.find_by_id(id).await? {
                None => Err(AppError::NotFound("Timesheet entry not found".to_string())),
                Some(entry) if entry.user_id != actor.id => {
                    Err(AppError::Forbidden("Forbidden".to_string()))
                }
                Some(_) => Err(AppError::AlreadyProcessed("timesheet entry".to_string())),
            };
        }
        Ok(())
    }

    /// The acting user's own entries, newest working date first.
    pub async fn list_for(
        &self,
        actor: &User,
        pagination: &PaginationQuery,
    ) -> Result<Vec<TimesheetEntry>, AppError> {
        self.timesheets
            .find_by_user(actor.id, pagination.limit(), pagination.offset())
            .await
    }

    async fn ensure_working_day(&self, date: NaiveDate) -> Result<(), AppError> {
        if is_weekend(date) {
            return Err(AppError::WeekendViolation(date));
        }
        if let Some(holiday) = self.holidays.find_on(date).await? {
            return Err(AppError::HolidayViolation {
                date,
                name: holiday.name,
            });
        }
        Ok(())
    }

    /// The day's capacity minus the minutes consumed by approved day-off
    /// requests overlapping the date's 24-hour window.
    ///
    /// Consumption accumulates across overlapping approvals but is clamped
    /// at a full day; the scan stops early once the clamp is reached.
    async fn leave_adjusted_cap(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<i64, AppError> {
        let (day_start, day_end) = local_day_bounds(date, &self.time_zone)?;
        let approved = self
            .day_offs
            .find_overlapping(user_id, day_start, day_end, Some(RequestStatus::Approved))
            .await?;

        let mut consumed = 0i64;
        for leave in &approved {
            let start_local = leave.start_at.with_timezone(&self.time_zone).naive_local();
            let end_local = leave.end_at.with_timezone(&self.time_zone).naive_local();
            let per_date = work_hours::remaining_capacity(start_local, end_local)?;
            let remaining = per_date
                .get(&date)
                .copied()
                .unwrap_or(DAILY_CAPACITY_MINUTES);
            consumed += DAILY_CAPACITY_MINUTES - remaining;
            if consumed >= DAILY_CAPACITY_MINUTES {
                consumed = DAILY_CAPACITY_MINUTES;
                break;
            }
        }

        Ok(DAILY_CAPACITY_MINUTES - consumed)
    }
}

fn normal_minutes(entries: &[TimesheetEntry], exclude: Option<TimesheetEntryId>) -> i64 {
    entries
        .iter()
        .filter(|entry| entry.entry_type == EntryType::Normal)
        .filter(|entry| Some(entry.id) != exclude)
        .map(|entry| i64::from(entry.minutes))
        .sum()
}

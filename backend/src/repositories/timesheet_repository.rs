//! Timesheet entry repository.
//!
//! The write operations double as invariant guards: inserts and updates of
//! `normal` entries re-assert the daily capacity inside the statement itself,
//! and decisions only match rows still in `pending`. Checking
//! `rows_affected` therefore closes the read-then-write races described by
//! the concurrency model without explicit locking.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::request::RequestStatus;
use crate::models::timesheet::TimesheetEntry;
use crate::types::{TimesheetEntryId, UserId};

const COLUMNS: &str = "id, user_id, project_id, title, description, working_date, minutes, \
     entry_type, status, deleted, decided_by, decided_at, decision_comment, created_at, updated_at";

const TABLE: &str = "timesheet_entries";

/// Repository trait for timesheet entry operations.
///
/// Designed to be mockable with mockall; use `MockTimesheetRepositoryTrait`
/// in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimesheetRepositoryTrait: Send + Sync {
    /// Find a non-deleted entry by ID.
    async fn find_by_id(&self, id: TimesheetEntryId) -> Result<Option<TimesheetEntry>, AppError>;

    /// All non-deleted, non-rejected entries of a user on a working date.
    async fn find_for_user_on(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<TimesheetEntry>, AppError>;

    /// Page through a user's non-deleted entries, newest working date first.
    async fn find_by_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimesheetEntry>, AppError>;

    /// Insert a new entry. When `normal_cap_minutes` is given, the insert
    /// only succeeds while the sum of the user's non-rejected `normal`
    /// minutes on that date plus the new entry stays within the cap.
    /// Returns `false` when the guard turned the insert away.
    async fn insert(
        &self,
        entry: &TimesheetEntry,
        normal_cap_minutes: Option<i64>,
    ) -> Result<bool, AppError>;

    /// Update a still-pending entry owned by its user, under the same
    /// optional capacity guard (the entry itself is excluded from the sum).
    async fn update_pending(
        &self,
        entry: &TimesheetEntry,
        normal_cap_minutes: Option<i64>,
    ) -> Result<u64, AppError>;

    /// Transition a pending entry into a terminal status.
    async fn decide(
        &self,
        id: TimesheetEntryId,
        status: RequestStatus,
        decided_by: UserId,
        comment: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<u64, AppError>;

    /// Soft-delete a pending entry owned by the user.
    async fn soft_delete_pending(
        &self,
        id: TimesheetEntryId,
        user_id: UserId,
        timestamp: DateTime<Utc>,
    ) -> Result<u64, AppError>;
}

/// Concrete implementation of TimesheetRepositoryTrait backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct TimesheetRepository {
    pool: PgPool,
}

impl TimesheetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimesheetRepositoryTrait for TimesheetRepository {
    async fn find_by_id(&self, id: TimesheetEntryId) -> Result<Option<TimesheetEntry>, AppError> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 AND deleted = FALSE",
            COLUMNS, TABLE
        );
        let row = sqlx::query_as::<_, TimesheetEntry>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_for_user_on(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<TimesheetEntry>, AppError> {
        let query = format!(
            "SELECT {} FROM {} WHERE user_id = $1 AND working_date = $2 \
             AND status <> 'rejected' AND deleted = FALSE ORDER BY created_at",
            COLUMNS, TABLE
        );
        let rows = sqlx::query_as::<_, TimesheetEntry>(&query)
            .bind(user_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimesheetEntry>, AppError> {
        let query = format!(
            "SELECT {} FROM {} WHERE user_id = $1 AND deleted = FALSE \
             ORDER BY working_date DESC, created_at DESC LIMIT $2 OFFSET $3",
            COLUMNS, TABLE
        );
        let rows = sqlx::query_as::<_, TimesheetEntry>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert(
        &self,
        entry: &TimesheetEntry,
        normal_cap_minutes: Option<i64>,
    ) -> Result<bool, AppError> {
        let query = format!(
            "INSERT INTO {} ({}) \
             SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15 \
             WHERE $16::BIGINT IS NULL OR COALESCE((\
                 SELECT SUM(minutes) FROM {} \
                 WHERE user_id = $2 AND working_date = $6 AND entry_type = 'normal' \
                   AND status <> 'rejected' AND deleted = FALSE\
             ), 0) + $7 <= $16",
            TABLE, COLUMNS, TABLE
        );
        let result = sqlx::query(&query)
            .bind(entry.id)
            .bind(entry.user_id)
            .bind(entry.project_id)
            .bind(&entry.title)
            .bind(&entry.description)
            .bind(entry.working_date)
            .bind(entry.minutes)
            .bind(entry.entry_type.db_value())
            .bind(entry.status.db_value())
            .bind(entry.deleted)
            .bind(entry.decided_by)
            .bind(entry.decided_at)
            .bind(&entry.decision_comment)
            .bind(entry.created_at)
            .bind(entry.updated_at)
            .bind(normal_cap_minutes)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_pending(
        &self,
        entry: &TimesheetEntry,
        normal_cap_minutes: Option<i64>,
    ) -> Result<u64, AppError> {
        let query = format!(
            "UPDATE {} SET title = $3, description = $4, working_date = $5, minutes = $6, \
             updated_at = $7 \
             WHERE id = $1 AND user_id = $2 AND status = 'pending' AND deleted = FALSE \
               AND ($8::BIGINT IS NULL OR COALESCE((\
                   SELECT SUM(minutes) FROM {} \
                   WHERE user_id = $2 AND working_date = $5 AND entry_type = 'normal' \
                     AND status <> 'rejected' AND deleted = FALSE AND id <> $1\
               ), 0) + $6 <= $8)",
            TABLE, TABLE
        );
        let result = sqlx::query(&query)
            .bind(entry.id)
            .bind(entry.user_id)
            .bind(&entry.title)
            .bind(&entry.description)
            .bind(entry.working_date)
            .bind(entry.minutes)
            .bind(entry.updated_at)
            .bind(normal_cap_minutes)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn decide(
        &self,
        id: TimesheetEntryId,
        status: RequestStatus,
        decided_by: UserId,
        comment: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let query = format!(
            "UPDATE {} SET status = $2, decided_by = $3, decided_at = $4, \
             decision_comment = $5, updated_at = $4 \
             WHERE id = $1 AND status = 'pending' AND deleted = FALSE",
            TABLE
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(status.db_value())
            .bind(decided_by)
            .bind(timestamp)
            .bind(comment)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn soft_delete_pending(
        &self,
        id: TimesheetEntryId,
        user_id: UserId,
        timestamp: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let query = format!(
            "UPDATE {} SET deleted = TRUE, updated_at = $3 \
             WHERE id = $1 AND user_id = $2 AND status = 'pending' AND deleted = FALSE",
            TABLE
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(user_id)
            .bind(timestamp)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_timesheet_repository_can_be_created() {
        let _mock = MockTimesheetRepositoryTrait::new();
    }

    #[test]
    fn mock_timesheet_repository_trait_bounds() {
        fn check_send_sync<T: Send + Sync>() {}
        check_send_sync::<MockTimesheetRepositoryTrait>();
    }
}

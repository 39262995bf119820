//! Day-off request repository.
//!
//! `find_overlapping` implements the half-open interval predicate
//! (`start_at < end AND end_at > start`) over a user's non-deleted requests.
//! `insert_if_free` re-runs the same predicate inside the insert statement so
//! two concurrent submissions cannot both slip past the overlap guard.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::day_off::DayOffRequest;
use crate::models::request::RequestStatus;
use crate::types::{DayOffRequestId, UserId};

const COLUMNS: &str = "id, user_id, title, reason, start_at, end_at, status, deleted, \
     decided_by, decided_at, decision_comment, created_at, updated_at";

const TABLE: &str = "day_off_requests";

/// Repository trait for day-off request operations.
///
/// Designed to be mockable with mockall; use `MockDayOffRepositoryTrait`
/// in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DayOffRepositoryTrait: Send + Sync {
    /// Find a non-deleted request by ID.
    async fn find_by_id(&self, id: DayOffRequestId) -> Result<Option<DayOffRequest>, AppError>;

    /// Page through a user's non-deleted requests, newest first.
    async fn find_by_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DayOffRequest>, AppError>;

    /// Non-deleted requests of the user whose interval overlaps
    /// `[start, end)`, optionally restricted to one status.
    async fn find_overlapping(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: Option<RequestStatus>,
    ) -> Result<Vec<DayOffRequest>, AppError>;

    /// Insert the request unless a non-deleted request of the same user
    /// already overlaps its interval. Returns `false` when the guard turned
    /// the insert away.
    async fn insert_if_free(&self, request: &DayOffRequest) -> Result<bool, AppError>;

    /// Transition a pending request into a terminal status.
    async fn decide(
        &self,
        id: DayOffRequestId,
        status: RequestStatus,
        decided_by: UserId,
        comment: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<u64, AppError>;

    /// Soft-delete a pending request owned by the user.
    async fn soft_delete_pending(
        &self,
        id: DayOffRequestId,
        user_id: UserId,
        timestamp: DateTime<Utc>,
    ) -> Result<u64, AppError>;
}

/// Concrete implementation of DayOffRepositoryTrait backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct DayOffRepository {
    pool: PgPool,
}

impl DayOffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DayOffRepositoryTrait for DayOffRepository {
    async fn find_by_id(&self, id: DayOffRequestId) -> Result<Option<DayOffRequest>, AppError> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 AND deleted = FALSE",
            COLUMNS, TABLE
        );
        let row = sqlx::query_as::<_, DayOffRequest>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DayOffRequest>, AppError> {
        let query = format!(
            "SELECT {} FROM {} WHERE user_id = $1 AND deleted = FALSE \
             ORDER BY start_at DESC LIMIT $2 OFFSET $3",
            COLUMNS, TABLE
        );
        let rows = sqlx::query_as::<_, DayOffRequest>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_overlapping(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: Option<RequestStatus>,
    ) -> Result<Vec<DayOffRequest>, AppError> {
        let query = format!(
            "SELECT {} FROM {} WHERE user_id = $1 AND deleted = FALSE \
             AND start_at < $3 AND end_at > $2 \
             AND ($4::TEXT IS NULL OR status = $4) \
             ORDER BY start_at",
            COLUMNS, TABLE
        );
        let rows = sqlx::query_as::<_, DayOffRequest>(&query)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .bind(status.map(|s| s.db_value()))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert_if_free(&self, request: &DayOffRequest) -> Result<bool, AppError> {
        let query = format!(
            "INSERT INTO {} ({}) \
             SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13 \
             WHERE NOT EXISTS (\
                 SELECT 1 FROM {} \
                 WHERE user_id = $2 AND deleted = FALSE \
                   AND start_at < $6 AND end_at > $5\
             )",
            TABLE, COLUMNS, TABLE
        );
        let result = sqlx::query(&query)
            .bind(request.id)
            .bind(request.user_id)
            .bind(&request.title)
            .bind(&request.reason)
            .bind(request.start_at)
            .bind(request.end_at)
            .bind(request.status.db_value())
            .bind(request.deleted)
            .bind(request.decided_by)
            .bind(request.decided_at)
            .bind(&request.decision_comment)
            .bind(request.created_at)
            .bind(request.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn decide(
        &self,
        id: DayOffRequestId,
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
        id: DayOffRequestId,
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
    fn mock_day_off_repository_can_be_created() {
        let _mock = MockDayOffRepositoryTrait::new();
    }

    #[test]
    fn mock_day_off_repository_trait_bounds() {
        fn check_send_sync<T: Send + Sync>() {}
        check_send_sync::<MockDayOffRepositoryTrait>();
    }
}

//! Public-holiday lookup.
//!
//! The holiday calendar is maintained out of band; the engine only consults
//! it through this narrow interface when validating standard entries.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::holiday::Holiday;

const COLUMNS: &str = "id, holiday_date, name, created_at, updated_at";

const TABLE: &str = "holidays";

/// Repository trait for public-holiday lookups.
///
/// Designed to be mockable with mockall; use `MockHolidayRepositoryTrait`
/// in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HolidayRepositoryTrait: Send + Sync {
    /// The public holiday on the given date, if any.
    async fn find_on(&self, date: NaiveDate) -> Result<Option<Holiday>, AppError>;

    /// All known public holidays in calendar order.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Holiday>, AppError>;
}

/// Concrete implementation of HolidayRepositoryTrait backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct HolidayRepository {
    pool: PgPool,
}

impl HolidayRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HolidayRepositoryTrait for HolidayRepository {
    async fn find_on(&self, date: NaiveDate) -> Result<Option<Holiday>, AppError> {
        let query = format!("SELECT {} FROM {} WHERE holiday_date = $1", COLUMNS, TABLE);
        let row = sqlx::query_as::<_, Holiday>(&query)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Holiday>, AppError> {
        let query = format!(
            "SELECT {} FROM {} ORDER BY holiday_date LIMIT $1 OFFSET $2",
            COLUMNS, TABLE
        );
        let rows = sqlx::query_as::<_, Holiday>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

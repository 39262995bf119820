//! User repository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::user::User;
use crate::types::UserId;

const COLUMNS: &str = "id, username, display_name, role, active, created_at, updated_at";

const TABLE: &str = "users";

/// Repository trait for user lookups.
///
/// Designed to be mockable with mockall; use `MockUserRepositoryTrait`
/// in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Find a user by ID.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError>;
}

/// Concrete implementation of UserRepositoryTrait backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, TABLE);
        let row = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

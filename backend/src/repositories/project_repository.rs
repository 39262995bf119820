//! Project and project-membership repository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::project::Project;
use crate::types::{ProjectId, UserId};

const COLUMNS: &str = "id, name, description, active, created_at, updated_at";

const TABLE: &str = "projects";

/// Repository trait for project lookups and the membership check.
///
/// Designed to be mockable with mockall; use `MockProjectRepositoryTrait`
/// in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepositoryTrait: Send + Sync {
    /// Find a project by ID.
    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, AppError>;

    /// Whether the user is an active member of the project.
    async fn is_member(&self, user_id: UserId, project_id: ProjectId) -> Result<bool, AppError>;

    /// Page through the active projects.
    async fn list_active(&self, limit: i64, offset: i64) -> Result<Vec<Project>, AppError>;
}

/// Concrete implementation of ProjectRepositoryTrait backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepositoryTrait for ProjectRepository {
    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, AppError> {
        let query = format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, TABLE);
        let row = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn is_member(&self, user_id: UserId, project_id: ProjectId) -> Result<bool, AppError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(\
                 SELECT 1 FROM project_members \
                 WHERE project_id = $1 AND user_id = $2 AND active = TRUE\
             )",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn list_active(&self, limit: i64, offset: i64) -> Result<Vec<Project>, AppError> {
        let query = format!(
            "SELECT {} FROM {} WHERE active = TRUE ORDER BY name LIMIT $1 OFFSET $2",
            COLUMNS, TABLE
        );
        let rows = sqlx::query_as::<_, Project>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

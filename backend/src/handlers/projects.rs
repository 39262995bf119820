use axum::{
    extract::{Extension, Query, State},
    Json,
};

use crate::{
    error::AppError,
    models::{project::ProjectResponse, user::User, PaginatedResponse, PaginationQuery},
    state::AppState,
};

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(_user): Extension<User>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<ProjectResponse>>, AppError> {
    let projects = state
        .projects
        .list_active(pagination.limit(), pagination.offset())
        .await?;
    let data = projects.into_iter().map(ProjectResponse::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.limit(),
        pagination.offset(),
    )))
}

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        day_off::{CreateDayOffRequest, DayOffResponse},
        request::DecisionRequest,
        user::User,
        PaginatedResponse, PaginationQuery,
    },
    state::AppState,
    types::DayOffRequestId,
};

pub async fn create_day_off(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateDayOffRequest>,
) -> Result<(StatusCode, Json<DayOffResponse>), AppError> {
    payload.validate()?;
    let request = state.day_offs.create_request(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(DayOffResponse::from(request))))
}

pub async fn get_my_day_offs(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<DayOffResponse>>, AppError> {
    let requests = state.day_offs.list_for(&user, &pagination).await?;
    let data = requests.into_iter().map(DayOffResponse::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.limit(),
        pagination.offset(),
    )))
}

pub async fn decide_day_off(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<DayOffRequestId>,
    Json(payload): Json<DecisionRequest>,
) -> Result<Json<DayOffResponse>, AppError> {
    let request = state.day_offs.decide_request(&user, id, payload).await?;
    Ok(Json(DayOffResponse::from(request)))
}

pub async fn delete_day_off(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<DayOffRequestId>,
) -> Result<StatusCode, AppError> {
    state.day_offs.delete_request(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

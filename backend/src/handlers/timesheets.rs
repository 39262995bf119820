use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        request::DecisionRequest,
        timesheet::{CreateTimesheetRequest, TimesheetResponse, UpdateTimesheetRequest},
        user::User,
        PaginatedResponse, PaginationQuery,
    },
    state::AppState,
    types::TimesheetEntryId,
};

pub async fn create_timesheet(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateTimesheetRequest>,
) -> Result<(StatusCode, Json<TimesheetResponse>), AppError> {
    payload.validate()?;
    let entry = state.timesheets.create_entry(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(TimesheetResponse::from(entry))))
}

pub async fn get_my_timesheets(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<TimesheetResponse>>, AppError> {
    let entries = state.timesheets.list_for(&user, &pagination).await?;
    let data = entries.into_iter().map(TimesheetResponse::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.limit(),
        pagination.offset(),
    )))
}

pub async fn update_timesheet(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<TimesheetEntryId>,
    Json(payload): Json<UpdateTimesheetRequest>,
) -> Result<Json<TimesheetResponse>, AppError> {
    payload.validate()?;
    let entry = state.timesheets.update_entry(&user, id, payload).await?;
    Ok(Json(TimesheetResponse::from(entry)))
}

pub async fn decide_timesheet(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<TimesheetEntryId>,
    Json(payload): Json<DecisionRequest>,
) -> Result<Json<TimesheetResponse>, AppError> {
    let entry = state.timesheets.decide_entry(&user, id, payload).await?;
    Ok(Json(TimesheetResponse::from(entry)))
}

pub async fn delete_timesheet(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<TimesheetEntryId>,
) -> Result<StatusCode, AppError> {
    state.timesheets.delete_entry(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    extract::{Extension, Query, State},
    Json,
};

use crate::{
    error::AppError,
    models::{holiday::HolidayResponse, user::User, PaginatedResponse, PaginationQuery},
    state::AppState,
};

pub async fn list_public_holidays(
    State(state): State<AppState>,
    Extension(_user): Extension<User>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<HolidayResponse>>, AppError> {
    let holidays = state
        .holidays
        .list(pagination.limit(), pagination.offset())
        .await?;
    let data = holidays.into_iter().map(HolidayResponse::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.limit(),
        pagination.offset(),
    )))
}

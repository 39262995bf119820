//! Trusted-header identity resolution.
//!
//! Authentication lives in front of this service; requests arrive with the
//! caller already identified by the `x-user-id` header. This middleware
//! resolves the header to an active user and injects it as an extension for
//! the handlers.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::types::UserId;

const USER_ID_HEADER: &str = "x-user-id";

pub async fn identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".to_string()))?;

    let user_id: UserId = header
        .parse()
        .map_err(|_| AppError::Unauthorized("Malformed x-user-id header".to_string()))?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .filter(|user| user.active)
        .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::services::work_hours::minutes_to_hours;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Central error type for the engine and its HTTP shell.
///
/// Engine-level failures carry a distinct variant each so callers can react
/// to the kind, not the message. All of them are detected before any write.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} falls on a weekend")]
    WeekendViolation(NaiveDate),
    #[error("{date} is a public holiday ({name})")]
    HolidayViolation { date: NaiveDate, name: String },
    #[error("interval overlaps day-off request \"{conflicting_title}\" ({conflicting_id})")]
    OverlapConflict {
        conflicting_id: String,
        conflicting_title: String,
    },
    #[error(
        "daily capacity exceeded: at most {} hours may be logged on this date",
        minutes_to_hours(*.max_allowed_minutes)
    )]
    CapacityExceeded { max_allowed_minutes: i64 },
    #[error("{0} has already been processed")]
    AlreadyProcessed(String),
    #[error("{0}")]
    InvalidInterval(String),
    #[error("Validation failed")]
    Validation(Vec<String>),
    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::WeekendViolation(_) => (StatusCode::BAD_REQUEST, "WEEKEND_VIOLATION"),
            AppError::HolidayViolation { .. } => (StatusCode::BAD_REQUEST, "HOLIDAY_VIOLATION"),
            AppError::OverlapConflict { .. } => (StatusCode::CONFLICT, "OVERLAP_CONFLICT"),
            AppError::CapacityExceeded { .. } => (StatusCode::CONFLICT, "CAPACITY_EXCEEDED"),
            AppError::AlreadyProcessed(_) => (StatusCode::CONFLICT, "ALREADY_PROCESSED"),
            AppError::InvalidInterval(_) => (StatusCode::BAD_REQUEST, "INVALID_INTERVAL"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
            }
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            AppError::Validation(errors) => Some(serde_json::json!({ "errors": errors })),
            AppError::CapacityExceeded {
                max_allowed_minutes,
            } => Some(serde_json::json!({
                "max_allowed_minutes": max_allowed_minutes,
                "max_allowed_hours": minutes_to_hours(*max_allowed_minutes),
            })),
            AppError::OverlapConflict { conflicting_id, .. } => {
                Some(serde_json::json!({ "conflicting_id": conflicting_id }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::InternalServerError(err) = &self {
            tracing::error!("Internal server error: {:?}", err);
        }

        let (status, code) = self.status_and_code();
        let details = self.details();
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::InternalServerError(err.into()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let code = e.code.as_ref();
                    format!("{}: {}", field, code)
                })
            })
            .collect();
        AppError::Validation(messages)
    }
}

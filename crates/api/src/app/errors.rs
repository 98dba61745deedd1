use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use bazaar_core::FieldError;
use bazaar_infra::{ServiceError, StoreError};

use crate::authz::AuthzError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation { details, .. } => validation_error(details),
        ServiceError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        err @ ServiceError::InsufficientStock { .. } => {
            json_error(StatusCode::CONFLICT, "insufficient_stock", err.to_string())
        }
        ServiceError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        ServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        ServiceError::Invariant(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        ServiceError::Persistence(e) => {
            tracing::error!(error = %e, "persistence failure");
            let message = match e {
                StoreError::Backend(_) => "storage backend unavailable".to_string(),
                other => other.to_string(),
            };
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message)
        }
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn validation_error(details: Vec<FieldError>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "status": "error",
            "error": "validation_error",
            "message": "Validation Error",
            "details": details,
        })),
    )
        .into_response()
}

/// Single-field validation failure, e.g. a malformed path id.
pub fn invalid_field(field: &str, message: impl Into<String>) -> axum::response::Response {
    validation_error(vec![FieldError {
        field: field.to_string(),
        message: message.into(),
    }])
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "status": "error",
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

use std::str::FromStr;

use axum::{Json, extract::rejection::JsonRejection, response::Response};

use crate::app::errors;
use crate::authz;
use crate::context::{PrincipalContext, Role};

/// Unwrap a JSON body, turning malformed input into a 400 validation error.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| errors::invalid_field("body", rejection.body_text()))
}

/// Parse an identifier from a path segment or body field.
pub fn parse_id<T: FromStr>(field: &str, raw: &str) -> Result<T, Response> {
    raw.trim()
        .parse()
        .map_err(|_| errors::invalid_field(field, format!("`{raw}` is not a valid id")))
}

pub fn require_role(principal: &PrincipalContext, role: Role) -> Result<(), Response> {
    authz::require_role(principal, role).map_err(|e| {
        tracing::warn!(user_id = %principal.user_id(), error = %e, "role check failed");
        errors::authz_error_to_response(e)
    })
}

use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use bazaar_core::UserId;

use crate::app::errors::json_error;
use crate::context::{PrincipalContext, Role};

/// Header carrying the authenticated user's id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the role the user acts in (`customer` or `seller`).
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Turn the trusted identity headers into a [`PrincipalContext`] extension.
pub async fn identity_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let principal = extract_principal(req.headers()).map_err(|message| {
        tracing::warn!(path = %req.uri().path(), %message, "rejected unauthenticated request");
        json_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
    })?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

fn extract_principal(headers: &HeaderMap) -> Result<PrincipalContext, String> {
    let user_id: UserId = header(headers, USER_ID_HEADER)?
        .parse()
        .map_err(|_| format!("{USER_ID_HEADER} must be a UUID"))?;
    let role: Role = header(headers, USER_ROLE_HEADER)?.parse()?;
    Ok(PrincipalContext::new(user_id, role))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, String> {
    let value = headers
        .get(name)
        .ok_or_else(|| format!("missing {name} header"))?
        .to_str()
        .map_err(|_| format!("{name} header is not valid text"))?
        .trim();
    if value.is_empty() {
        return Err(format!("{name} header is empty"));
    }
    Ok(value)
}

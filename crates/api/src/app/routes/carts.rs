use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::{get, post},
};

use bazaar_cart::CartLineId;
use bazaar_catalog::ProductId;

use crate::app::routes::common::{body, parse_id, require_role};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, Role};

pub fn router() -> Router {
    Router::new()
        .route("/", post(add_to_cart).get(list_cart))
        .route("/:id", get(get_cart_line).put(update_cart_line).delete(remove_cart_line))
}

pub async fn add_to_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<dto::AddToCartRequest>, JsonRejection>,
) -> Result<Response, Response> {
    require_role(&principal, Role::Customer)?;
    let request = body(payload)?;
    let product_id: ProductId = parse_id("product_id", &request.product_id)?;

    let line = services
        .cart_add(principal.user_id(), product_id, request.qty)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(dto::success(StatusCode::CREATED, dto::CartLineResponse::from(&line)))
}

pub async fn list_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, Response> {
    require_role(&principal, Role::Customer)?;
    let entries = services
        .cart_list(principal.user_id())
        .await
        .map_err(errors::service_error_to_response)?;
    let data: Vec<dto::CartLineResponse> = entries.iter().map(dto::CartLineResponse::from).collect();
    Ok(dto::success(StatusCode::OK, data))
}

pub async fn get_cart_line(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    require_role(&principal, Role::Customer)?;
    let id: CartLineId = parse_id("id", &id)?;
    let entry = services
        .cart_get(principal.user_id(), id)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(dto::success(StatusCode::OK, dto::CartLineResponse::from(&entry)))
}

pub async fn update_cart_line(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateCartLineRequest>, JsonRejection>,
) -> Result<Response, Response> {
    require_role(&principal, Role::Customer)?;
    let id: CartLineId = parse_id("id", &id)?;
    let request = body(payload)?;

    let line = services
        .cart_update(principal.user_id(), id, request.qty)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(dto::success(StatusCode::OK, dto::CartLineResponse::from(&line)))
}

pub async fn remove_cart_line(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    require_role(&principal, Role::Customer)?;
    let id: CartLineId = parse_id("id", &id)?;
    services
        .cart_remove(principal.user_id(), id)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(dto::success(StatusCode::OK, serde_json::json!({ "id": id })))
}

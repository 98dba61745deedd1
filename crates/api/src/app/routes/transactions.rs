//! Checkout and order endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
};

use bazaar_cart::CartLineId;
use bazaar_catalog::ProductId;
use bazaar_orders::{OrderId, OrderStatus};

use crate::app::routes::common::{body, parse_id, require_role};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, Role};

pub fn router() -> Router {
    Router::new()
        .route("/direct", post(direct_checkout))
        .route("/bycart", post(cart_checkout))
        .route("/customer", get(customer_orders))
        .route("/seller", get(seller_orders))
        .route("/:id", put(update_status))
}

pub async fn direct_checkout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<dto::DirectCheckoutRequest>, JsonRejection>,
) -> Result<Response, Response> {
    require_role(&principal, Role::Customer)?;
    let request = body(payload)?;
    let product_id: ProductId = parse_id("product_id", &request.product_id)?;

    let order = services
        .checkout_direct(principal.user_id(), product_id, request.qty)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(dto::success(StatusCode::CREATED, dto::OrderResponse::from(&order)))
}

/// Check out a subset of the caller's cart lines.
///
/// Ids that are not the caller's are ignored; a request where none remain
/// answers 404.
pub async fn cart_checkout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<dto::CartCheckoutRequest>, JsonRejection>,
) -> Result<Response, Response> {
    require_role(&principal, Role::Customer)?;
    let request = body(payload)?;
    let ids = request
        .item_ids
        .iter()
        .map(|raw| parse_id::<CartLineId>("itemIds", raw))
        .collect::<Result<Vec<_>, _>>()?;

    let order = services
        .checkout_by_cart(principal.user_id(), &ids)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(dto::success(StatusCode::CREATED, dto::OrderResponse::from(&order)))
}

pub async fn customer_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, Response> {
    require_role(&principal, Role::Customer)?;
    let orders = services
        .orders_for_buyer(principal.user_id())
        .await
        .map_err(errors::service_error_to_response)?;
    let data: Vec<dto::OrderResponse> = orders.iter().map(dto::OrderResponse::from).collect();
    Ok(dto::success(StatusCode::OK, data))
}

pub async fn seller_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, Response> {
    require_role(&principal, Role::Seller)?;
    let orders = services
        .orders_for_seller(principal.user_id())
        .await
        .map_err(errors::service_error_to_response)?;
    let data: Vec<dto::OrderResponse> = orders.iter().map(dto::OrderResponse::from).collect();
    Ok(dto::success(StatusCode::OK, data))
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateStatusRequest>, JsonRejection>,
) -> Result<Response, Response> {
    require_role(&principal, Role::Seller)?;
    let id: OrderId = parse_id("id", &id)?;
    let request = body(payload)?;
    let status: OrderStatus = request
        .status
        .parse()
        .map_err(|e: bazaar_core::DomainError| errors::validation_error(e.field_errors()))?;

    let order = services
        .update_order_status(principal.user_id(), id, status)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(dto::success(StatusCode::OK, dto::OrderResponse::from(&order)))
}

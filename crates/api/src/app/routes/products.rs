use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::{get, post},
};

use bazaar_catalog::ProductId;

use crate::app::routes::common::{body, parse_id, require_role};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, Role};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> Result<Response, Response> {
    require_role(&principal, Role::Seller)?;
    let request = body(payload)?;

    let product = services
        .create_product(principal.user_id(), request.into())
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(dto::success(StatusCode::CREATED, dto::ProductResponse::from(&product)))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, Response> {
    let products = services
        .list_products()
        .await
        .map_err(errors::service_error_to_response)?;
    let data: Vec<dto::ProductResponse> = products.iter().map(dto::ProductResponse::from).collect();
    Ok(dto::success(StatusCode::OK, data))
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let id: ProductId = parse_id("id", &id)?;
    let product = services
        .get_product(id)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(dto::success(StatusCode::OK, dto::ProductResponse::from(&product)))
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateProductRequest>, JsonRejection>,
) -> Result<Response, Response> {
    require_role(&principal, Role::Seller)?;
    let id: ProductId = parse_id("id", &id)?;
    let request = body(payload)?;

    let product = services
        .update_product(principal.user_id(), id, request.into())
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(dto::success(StatusCode::OK, dto::ProductResponse::from(&product)))
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    require_role(&principal, Role::Seller)?;
    let id: ProductId = parse_id("id", &id)?;
    services
        .delete_product(principal.user_id(), id)
        .await
        .map_err(errors::service_error_to_response)?;
    Ok(dto::success(StatusCode::OK, serde_json::json!({ "id": id })))
}

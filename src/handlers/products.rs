use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::handlers::common::{map_service_error, success_response};
use crate::{
    errors::{ApiError, ServiceError},
    AppState,
};

/// Creates the router for product endpoints
pub fn products_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
}

/// List active products
async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .list_active()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// Fetch a single product by id
async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let product = state
        .services
        .catalog
        .find_by_id(id)
        .await
        .map_err(map_service_error)?
        .ok_or(ServiceError::ProductNotFound(id))
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

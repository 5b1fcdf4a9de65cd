use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::handlers::common::{
    created_response, map_service_error, success_response, CurrentUser, SessionId,
};
use crate::{errors::ApiError, AppState};

/// Creates the router for sale endpoints
pub fn sales_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/confirm", post(confirm_sale))
        .route("/{id}", get(get_receipt))
}

/// Confirm the session cart as a sale.
///
/// Delegates to the sale recorder's single transaction; on success the
/// session cart is cleared. On failure (insufficient stock, stale product)
/// the cart is left intact so the caller can correct it and retry.
async fn confirm_sale(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state.sessions.cart(&session.0);

    let receipt = state
        .services
        .sales
        .confirm_sale(user_id, &cart)
        .await
        .map_err(map_service_error)?;

    state.sessions.update(&session.0, |cart| cart.clear());

    Ok(created_response(receipt))
}

/// Fetch the receipt for a recorded sale
async fn get_receipt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let receipt = state
        .services
        .sales
        .get_receipt(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(receipt))
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::handlers::common::{
    map_service_error, no_content_response, success_response, SessionId,
};
use crate::services::{catalog::ResolvedLine, pricing::PricingCalculator};
use crate::{entities::product::ProductType, errors::ApiError, AppState};

/// Creates the router for cart endpoints. All of them are pure session-state
/// manipulation; nothing here touches stock.
pub fn cart_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(view_cart))
        .route(
            "/items/{product_id}",
            post(add_to_cart).delete(remove_one_from_cart),
        )
        .route("/clear", post(clear_cart))
}

/// One display line of a resolved cart.
#[derive(Debug, Serialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub product_type: ProductType,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

/// Resolved cart with display totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CartView {
    fn build(lines: Vec<ResolvedLine>, pricing: &PricingCalculator) -> Self {
        let totals = pricing.totals(lines.iter().map(|l| (l.product.price, l.quantity)));
        let lines = lines
            .into_iter()
            .map(|l| CartLine {
                product_id: l.product.id,
                name: l.product.name,
                product_type: l.product.product_type,
                unit_price: l.product.price,
                quantity: l.quantity,
                line_total: PricingCalculator::line_total(l.product.price, l.quantity),
            })
            .collect();

        Self {
            lines,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
        }
    }
}

/// Resolved cart contents with display totals. Stale entries referencing
/// deleted products are dropped from the view.
async fn view_cart(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state.sessions.cart(&session.0);
    let lines = state
        .services
        .catalog
        .resolve_cart(&cart)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(CartView::build(
        lines,
        &state.services.pricing,
    )))
}

/// Add one unit of the product to the session cart
async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Path(product_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .sessions
        .update(&session.0, |cart| cart.add(product_id));

    let cart = state.sessions.cart(&session.0);
    let lines = state
        .services
        .catalog
        .resolve_cart(&cart)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(CartView::build(
        lines,
        &state.services.pricing,
    )))
}

/// Remove one unit; a no-op when the product is not in the cart.
async fn remove_one_from_cart(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Path(product_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .sessions
        .update(&session.0, |cart| cart.remove_one(product_id));

    Ok(no_content_response())
}

/// Empty the session cart
async fn clear_cart(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state.sessions.update(&session.0, |cart| cart.clear());

    Ok(success_response(serde_json::json!({
        "message": "Cart cleared"
    })))
}

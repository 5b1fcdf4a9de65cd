//! POS API Library
//!
//! Product catalog, per-session shopping carts, and the transactional sale
//! recorder behind them.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;
pub mod sessions;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;

/// Shared application state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub sessions: Arc<sessions::SessionStore>,
    pub services: handlers::AppServices,
}

/// Assembles the `/api/v1` route tree.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/products", handlers::products::products_routes())
        .nest("/cart", handlers::cart::cart_routes())
        .nest("/sales", handlers::sales::sales_routes())
}

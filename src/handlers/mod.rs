pub mod cart;
pub mod common;
pub mod products;
pub mod sales;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    config::AppConfig,
    events::EventSender,
    services::{catalog::CatalogService, pricing::PricingCalculator, sales::SaleService},
};

/// Aggregated services used by the HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub sales: Arc<SaleService>,
    pub pricing: PricingCalculator,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: &AppConfig,
    ) -> Self {
        let pricing = PricingCalculator::new(config.tax_rate);
        Self {
            catalog: Arc::new(CatalogService::new(db.clone())),
            sales: Arc::new(SaleService::new(db, event_sender, pricing.clone())),
            pricing,
        }
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entities::product,
    errors::ServiceError,
    services::cart::Cart,
};

/// A cart entry joined with live product data.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLine {
    pub product: product::Model,
    pub quantity: i32,
}

/// Read-side access to the product catalog.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<product::Model>, ServiceError> {
        Ok(product::Entity::find_by_id(id).one(&*self.db).await?)
    }

    pub async fn list_active(&self) -> Result<Vec<product::Model>, ServiceError> {
        Ok(product::Entity::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_asc(product::Column::Name)
            .all(&*self.db)
            .await?)
    }

    /// Joins cart entries against live products in a single query.
    ///
    /// Entries whose product no longer exists are silently dropped: a stale
    /// cart line disappears from the display totals rather than erroring.
    /// The sale recorder re-resolves on its own inside the confirmation
    /// transaction and is stricter.
    #[instrument(skip(self, cart))]
    pub async fn resolve_cart(&self, cart: &Cart) -> Result<Vec<ResolvedLine>, ServiceError> {
        if cart.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = cart.product_ids().collect();
        let products = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(&*self.db)
            .await?;

        let by_id: HashMap<Uuid, product::Model> =
            products.into_iter().map(|p| (p.id, p)).collect();

        let lines = cart
            .entries()
            .filter_map(|(product_id, qty)| {
                by_id.get(&product_id).map(|product| ResolvedLine {
                    product: product.clone(),
                    quantity: qty as i32,
                })
            })
            .collect();

        Ok(lines)
    }
}

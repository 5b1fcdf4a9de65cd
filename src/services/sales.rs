use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, ModelTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{product, sale, sale_item},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{cart::Cart, pricing::PricingCalculator},
};

/// A persisted sale with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct SaleReceipt {
    pub sale: sale::Model,
    pub items: Vec<sale_item::Model>,
}

/// Records sales: the one place where durable correctness matters.
///
/// `confirm_sale` converts a cart into a `Sale` plus `SaleItem` rows and
/// decrements stock, all inside a single transaction. Any failure rolls the
/// whole operation back; stock never goes negative and no partial sale is
/// ever visible.
#[derive(Debug, Clone)]
pub struct SaleService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    pricing: PricingCalculator,
}

impl SaleService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        pricing: PricingCalculator,
    ) -> Self {
        Self {
            db,
            event_sender,
            pricing,
        }
    }

    /// Confirms the cart as a sale for `user_id`.
    ///
    /// Steps, in order: re-resolve every cart entry (missing products fail
    /// with `ProductNotFound` rather than silently shrinking the sale),
    /// check-and-decrement stock for stock-tracked products, compute totals
    /// from the prices read inside the transaction, persist the sale header
    /// and one item per entry. Prices submitted by clients are never
    /// consulted.
    #[instrument(skip(self, cart), fields(user_id = %user_id))]
    pub async fn confirm_sale(
        &self,
        user_id: Uuid,
        cart: &Cart,
    ) -> Result<SaleReceipt, ServiceError> {
        if cart.is_empty() {
            return Err(ServiceError::InvalidOperation("Cart is empty".to_string()));
        }

        let txn = self.db.begin().await?;

        let ids: Vec<Uuid> = cart.product_ids().collect();
        let products = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(&txn)
            .await?;
        let by_id: HashMap<Uuid, product::Model> =
            products.into_iter().map(|p| (p.id, p)).collect();

        let mut lines: Vec<(product::Model, i32)> = Vec::with_capacity(cart.len());
        for (product_id, qty) in cart.entries() {
            let product = by_id
                .get(&product_id)
                .cloned()
                .ok_or(ServiceError::ProductNotFound(product_id))?;
            lines.push((product, qty as i32));
        }

        for (product, qty) in &lines {
            if product.product_type == product::ProductType::Stock {
                self.decrement_stock(&txn, product, *qty).await?;
            }
        }

        let totals = self
            .pricing
            .totals(lines.iter().map(|(p, qty)| (p.price, *qty)));

        let sale_id = Uuid::new_v4();
        let now = Utc::now();
        let sale = sale::ActiveModel {
            id: Set(sale_id),
            user_id: Set(user_id),
            subtotal: Set(totals.subtotal),
            tax: Set(totals.tax),
            total: Set(totals.total),
            created_at: Set(now),
        };
        let sale = sale.insert(&txn).await?;

        let mut items = Vec::with_capacity(lines.len());
        for (product, qty) in &lines {
            let item = sale_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                sale_id: Set(sale_id),
                product_id: Set(product.id),
                quantity: Set(*qty),
                unit_price: Set(product.price),
                line_total: Set(PricingCalculator::line_total(product.price, *qty)),
                created_at: Set(now),
            };
            items.push(item.insert(&txn).await?);
        }

        txn.commit().await?;

        for (product, qty) in &lines {
            if product.product_type == product::ProductType::Stock {
                self.event_sender
                    .send_or_log(Event::StockDecremented {
                        product_id: product.id,
                        quantity: *qty,
                    })
                    .await;
            }
        }
        self.event_sender
            .send_or_log(Event::SaleConfirmed {
                sale_id,
                user_id,
                total: sale.total,
            })
            .await;

        info!(%sale_id, items = items.len(), total = %sale.total, "recorded sale");
        Ok(SaleReceipt { sale, items })
    }

    /// Guarded check-and-decrement: the UPDATE only matches when enough stock
    /// remains, so two racing confirmations cannot both pass the check on any
    /// backend. Zero rows affected means the product vanished or is short.
    async fn decrement_stock<C: ConnectionTrait>(
        &self,
        txn: &C,
        product: &product::Model,
        qty: i32,
    ) -> Result<(), ServiceError> {
        let result = product::Entity::update_many()
            .col_expr(
                product::Column::Stock,
                Expr::col(product::Column::Stock).sub(qty),
            )
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(product.id))
            .filter(product::Column::Stock.gte(qty))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            // Re-read for an accurate error payload; the snapshot read at the
            // start of the transaction may be stale under contention.
            let available = product::Entity::find_by_id(product.id)
                .one(txn)
                .await?
                .and_then(|p| p.stock)
                .unwrap_or(0);
            return Err(ServiceError::InsufficientStock {
                product_id: product.id,
                requested: qty,
                available,
            });
        }

        Ok(())
    }

    /// Loads a sale with its items.
    pub async fn get_receipt(&self, sale_id: Uuid) -> Result<SaleReceipt, ServiceError> {
        let sale = sale::Entity::find_by_id(sale_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Sale {} not found", sale_id)))?;

        let items = sale.find_related(sale_item::Entity).all(&*self.db).await?;

        Ok(SaleReceipt { sale, items })
    }
}

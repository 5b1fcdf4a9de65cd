use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A session-scoped cart: product id mapped to quantity.
///
/// Purely a value type; it never talks to the catalog. Entries referencing
/// products that no longer exist are dropped during resolution, not here.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    entries: HashMap<Uuid, u32>,
}

impl Cart {
    /// Increments the quantity for `product_id` by one, starting from zero.
    pub fn add(&mut self, product_id: Uuid) {
        *self.entries.entry(product_id).or_insert(0) += 1;
    }

    /// Decrements the quantity by one, deleting the entry at zero.
    /// A no-op when the product is not in the cart.
    pub fn remove_one(&mut self, product_id: Uuid) {
        if let Some(qty) = self.entries.get_mut(&product_id) {
            if *qty <= 1 {
                self.entries.remove(&product_id);
            } else {
                *qty -= 1;
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct products in the cart.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn quantity(&self, product_id: Uuid) -> u32 {
        self.entries.get(&product_id).copied().unwrap_or(0)
    }

    pub fn entries(&self) -> impl Iterator<Item = (Uuid, u32)> + '_ {
        self.entries.iter().map(|(id, qty)| (*id, *qty))
    }

    pub fn product_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.entries.keys().copied()
    }
}

//! Cart store
//!
//! The single authoritative cart for a session. The cart is loaded from
//! storage when the store opens and written back after every mutation.
//! A failed write is logged and the in-memory cart stays as mutated.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    cart::{Cart, CartError, LineItem, LineItemId, VariantSelection},
    pricing::{CartTotals, PricingRules},
    products::Product,
    storage::{CART_KEY, KeyValueStore, load_json, save_json},
};

/// Session cart backed by durable storage.
#[derive(Debug)]
pub struct CartStore {
    storage: Arc<dyn KeyValueStore>,
    rules: PricingRules,
    cart: Cart,
    coupon_applied: bool,
}

impl CartStore {
    /// Open the store, restoring any persisted cart.
    ///
    /// Missing or unreadable data yields an empty cart.
    #[instrument(skip_all)]
    pub fn open(storage: Arc<dyn KeyValueStore>, rules: PricingRules) -> Self {
        let cart = match load_json::<Vec<LineItem>>(storage.as_ref(), CART_KEY) {
            Ok(Some(items)) => Cart::from_items(items),
            Ok(None) => Cart::new(),
            Err(err) => {
                warn!(error = %err, "discarding unreadable cart");
                Cart::new()
            }
        };

        info!(lines = cart.len(), "cart restored");

        Self {
            storage,
            rules,
            cart,
            coupon_applied: false,
        }
    }

    /// Current cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Pricing rules in force.
    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    /// Add `quantity` units of `product` and persist.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] when the quantity or variant is invalid; the
    /// cart is not modified in that case.
    #[instrument(skip(self, product, variant), fields(product = %product.id))]
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i64,
        variant: VariantSelection,
    ) -> Result<LineItemId, CartError> {
        let id = self.cart.add(product, quantity, variant)?;

        self.persist();

        Ok(id)
    }

    /// Remove a line and persist. Unknown ids change nothing.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, id: LineItemId) -> bool {
        let removed = self.cart.remove(id);

        if removed {
            self.persist();
        }

        removed
    }

    /// Set a line's quantity and persist. Values below 1 are ignored.
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, id: LineItemId, quantity: i64) -> bool {
        let changed = self.cart.update_quantity(id, quantity);

        if changed {
            self.persist();
        } else {
            debug!("quantity unchanged");
        }

        changed
    }

    /// Empty the cart and persist.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.cart.clear();
        self.coupon_applied = false;

        self.persist();
    }

    /// Apply the coupon for this session.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidCoupon`] when `code` is not recognized.
    pub fn apply_coupon(&mut self, code: &str) -> Result<(), CartError> {
        if !self.rules.coupon().matches(code) {
            return Err(CartError::InvalidCoupon(code.to_string()));
        }

        self.coupon_applied = true;

        Ok(())
    }

    /// Drop any applied coupon.
    pub fn remove_coupon(&mut self) {
        self.coupon_applied = false;
    }

    /// Whether a coupon is applied.
    pub fn coupon_applied(&self) -> bool {
        self.coupon_applied
    }

    /// Totals of the current cart.
    pub fn totals(&self) -> CartTotals {
        self.rules.totals(&self.cart, self.coupon_applied)
    }

    /// Total units in the cart.
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    fn persist(&self) {
        if let Err(err) = save_json(self.storage.as_ref(), CART_KEY, self.cart.items()) {
            warn!(error = %err, "failed to persist cart");
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::{
        products::test_support::product,
        storage::{MemoryStore, StorageError},
    };

    #[derive(Debug)]
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn book() -> Product {
        product("7", Decimal::new(40, 0), Decimal::ZERO)
    }

    #[test]
    fn mutations_are_visible_to_a_reopened_store() -> TestResult {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let mut store = CartStore::open(Arc::clone(&storage), PricingRules::default());
        let id = store.add_item(&book(), 2, VariantSelection::none())?;
        store.update_quantity(id, 3);

        let reopened = CartStore::open(storage, PricingRules::default());

        assert_eq!(reopened.cart(), store.cart());
        assert_eq!(reopened.item_count(), 3);

        Ok(())
    }

    #[test]
    fn failed_writes_keep_memory_state() -> TestResult {
        let mut store = CartStore::open(Arc::new(ReadOnlyStore), PricingRules::default());

        store.add_item(&book(), 1, VariantSelection::none())?;

        assert_eq!(store.item_count(), 1);

        Ok(())
    }

    #[test]
    fn corrupt_data_opens_empty() -> TestResult {
        let storage = Arc::new(MemoryStore::new());
        storage.set(CART_KEY, "[{\"broken\":")?;

        let store = CartStore::open(storage, PricingRules::default());

        assert!(store.cart().is_empty());

        Ok(())
    }

    #[test]
    fn coupon_applies_only_with_known_code() -> TestResult {
        let mut store = CartStore::open(Arc::new(MemoryStore::new()), PricingRules::default());
        store.add_item(&book(), 1, VariantSelection::none())?;

        assert_eq!(
            store.apply_coupon("SAVE50"),
            Err(CartError::InvalidCoupon("SAVE50".to_string()))
        );
        assert!(!store.coupon_applied());

        store.apply_coupon("DISCOUNT10")?;
        assert_eq!(store.totals().discount, Decimal::new(4, 0));

        store.remove_coupon();
        assert_eq!(store.totals().discount, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn clear_empties_and_persists() -> TestResult {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut store = CartStore::open(Arc::clone(&storage), PricingRules::default());
        store.add_item(&book(), 1, VariantSelection::none())?;

        store.clear();

        assert!(store.cart().is_empty());
        assert_eq!(storage.get(CART_KEY)?, Some("[]".to_string()));

        Ok(())
    }
}

//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    auth::{AuthError, Session, User},
    cart::{Cart, CartError, LineItem, LineItemId, VariantSelection},
    catalog::{Catalog, CatalogError, CatalogSource, InMemoryCatalog},
    checkout::{
        Checkout, CheckoutError, CheckoutStep, Order, OrderStatus, PaymentDetails,
        ShippingAddress,
    },
    config::{ConfigError, StoreConfig},
    fixtures::{Fixture, FixtureError},
    pricing::{CartTotals, Coupon, PricingRules},
    products::{Product, ProductKey, VariantAxis, VariantList},
    query::{PriceRange, ProductQuery, SortKey, facets::Facets},
    receipt::{Receipt, ReceiptError, TotalsView},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError},
    store::CartStore,
    tags::StringTagCollection,
};

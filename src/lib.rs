//! Storefront
//!
//! Catalog querying, cart aggregation and checkout for a small storefront
//! backed by an in-memory product list and durable client-side storage.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod query;
pub mod receipt;
pub mod storage;
pub mod store;
pub mod tags;

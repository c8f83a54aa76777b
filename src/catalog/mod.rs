//! Catalog
//!
//! The session-invariant product table. Products keep the order they were
//! loaded in; that order is what the `newest` sort returns.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use thiserror::Error;
use tracing::warn;

use crate::{
    products::{Product, ProductKey},
    query::{ProductQuery, facets::Facets},
};

pub mod source;

pub use source::{CatalogSource, InMemoryCatalog};

/// Errors raised by catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No product has the requested id.
    #[error("Product with ID {0} not found")]
    NotFound(String),
}

/// Catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: SlotMap<ProductKey, Product>,
    order: Vec<ProductKey>,
    ids: FxHashMap<String, ProductKey>,
}

impl Catalog {
    /// Build a catalog, keeping the iteration order of `products`.
    ///
    /// A product whose id was already seen is skipped.
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut catalog = Self::default();

        for product in products {
            if catalog.ids.contains_key(&product.id) {
                warn!(id = %product.id, "skipping duplicate product id");
                continue;
            }

            let id = product.id.clone();
            let key = catalog.products.insert(product);

            catalog.order.push(key);
            catalog.ids.insert(id, key);
        }

        catalog
    }

    /// Iterate over products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.order.iter().filter_map(|key| self.products.get(*key))
    }

    /// Look up a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no product has that id.
    pub fn get(&self, id: &str) -> Result<&Product, CatalogError> {
        self.ids
            .get(id)
            .and_then(|key| self.products.get(*key))
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Products whose category matches `category`, ignoring case.
    pub fn by_category(&self, category: &str) -> Vec<&Product> {
        ProductQuery::new().category(category).apply(self.iter())
    }

    /// Products matching the free-text `text`.
    pub fn search(&self, text: &str) -> Vec<&Product> {
        ProductQuery::new().text(text).apply(self.iter())
    }

    /// Run a full filter/sort query.
    pub fn query(&self, query: &ProductQuery) -> Vec<&Product> {
        query.apply(self.iter())
    }

    /// Distinct brands, sizes and colors across the catalog.
    pub fn facets(&self) -> Facets {
        Facets::from_products(self.iter())
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

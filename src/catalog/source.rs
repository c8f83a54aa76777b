//! Catalog data source.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use tokio::time::sleep;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError},
    products::Product,
};

/// Latency the mock data source waits before resolving.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// In-memory catalog that simulates a network round trip.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    catalog: Arc<Catalog>,
    latency: Duration,
}

impl InMemoryCatalog {
    /// Serve `catalog` with the default latency.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self::with_latency(catalog, DEFAULT_LATENCY)
    }

    /// Serve `catalog`, waiting `latency` before every response.
    #[must_use]
    pub fn with_latency(catalog: Catalog, latency: Duration) -> Self {
        Self {
            catalog: Arc::new(catalog),
            latency,
        }
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> Vec<Product> {
        self.delay().await;

        self.catalog.iter().cloned().collect()
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> Result<Product, CatalogError> {
        self.delay().await;

        self.catalog.get(id).cloned()
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_category(&self, category: &str) -> Vec<Product> {
        self.delay().await;

        self.catalog
            .by_category(category)
            .into_iter()
            .cloned()
            .collect()
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, text: &str) -> Vec<Product> {
        self.delay().await;

        let found: Vec<Product> = self.catalog.search(text).into_iter().cloned().collect();

        debug!(matches = found.len(), "search resolved");

        found
    }
}

/// Read-only product data source consumed by catalog views.
#[automock]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Every product, in catalog order.
    async fn list_all(&self) -> Vec<Product>;

    /// A single product by id.
    async fn get_by_id(&self, id: &str) -> Result<Product, CatalogError>;

    /// Products in `category` (case-insensitive).
    async fn list_by_category(&self, category: &str) -> Vec<Product>;

    /// Products whose name, description, brand, category or tags contain `text`.
    async fn search(&self, text: &str) -> Vec<Product>;
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::products::test_support::product;

    fn source(latency: Duration) -> InMemoryCatalog {
        InMemoryCatalog::with_latency(
            Catalog::from_products([
                product("1", Decimal::ONE, Decimal::ZERO),
                product("2", Decimal::TWO, Decimal::ZERO),
            ]),
            latency,
        )
    }

    #[tokio::test]
    async fn get_by_id_returns_product() -> TestResult {
        let product = source(Duration::ZERO).get_by_id("2").await?;

        assert_eq!(product.price, Decimal::TWO);

        Ok(())
    }

    #[tokio::test]
    async fn get_by_id_signals_not_found() {
        let result = source(Duration::ZERO).get_by_id("99").await;

        assert_eq!(result, Err(CatalogError::NotFound("99".to_string())));
    }

    #[tokio::test]
    async fn responses_wait_for_latency() {
        let started = Instant::now();

        let products = source(Duration::from_millis(20)).list_all().await;

        assert_eq!(products.len(), 2);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}

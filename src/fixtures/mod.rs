//! Fixtures
//!
//! YAML product fixtures. The seed catalog ships embedded in the crate; other
//! sets can be loaded from `<base>/products/<name>.yml`.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashSet;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::debug;

use crate::{catalog::Catalog, products::Product};

pub mod products;

/// Seed catalog of the storefront.
pub const SEED_PRODUCTS: &str = include_str!("../../fixtures/products/seed.yml");

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Rating outside 0.0-5.0
    #[error("Invalid rating for product {0}: {1}")]
    InvalidRating(String, f64),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Two products share an id
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Products in load order
    products: Vec<Product>,

    /// Ids seen so far
    ids: FxHashSet<String>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: Vec::new(),
            ids: FxHashSet::default(),
            currency: None,
        }
    }

    /// Fixture holding the embedded seed catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded YAML is malformed.
    pub fn seed() -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_products_str(SEED_PRODUCTS)?;

        Ok(fixture)
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        debug!(path = %file_path.display(), "loading product fixture");

        self.load_products_str(&contents)
    }

    /// Load products from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed, a product is invalid,
    /// an id repeats, or prices use more than one currency.
    pub fn load_products_str(&mut self, yaml: &str) -> Result<&mut Self, FixtureError> {
        let fixture: products::ProductsFixture = serde_norway::from_str(yaml)?;

        let mut currency = self.currency;
        let mut ids = FxHashSet::default();
        let mut loaded = Vec::with_capacity(fixture.products.len());

        for product_fixture in fixture.products {
            let (_amount, found) = products::parse_price(&product_fixture.price)?;

            match currency {
                Some(expected) if expected != found => {
                    return Err(FixtureError::CurrencyMismatch(
                        expected.iso_alpha_code.to_string(),
                        found.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => currency = Some(found),
            }

            if self.ids.contains(&product_fixture.id) || !ids.insert(product_fixture.id.clone()) {
                return Err(FixtureError::DuplicateProduct(product_fixture.id));
            }

            loaded.push(Product::try_from(product_fixture)?);
        }

        // Nothing is kept unless every product converted.
        self.currency = currency;
        self.ids.extend(ids);
        self.products.extend(loaded);

        Ok(self)
    }

    /// Products loaded so far, in load order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Currency shared by every loaded product
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCurrency`] if nothing has been loaded.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Build a catalog from the loaded products
    pub fn catalog(&self) -> Catalog {
        Catalog::from_products(self.products.iter().cloned())
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

//! Catalog queries
//!
//! A [`ProductQuery`] is a conjunction of independent filters followed by a
//! single stable sort. Unset filters (and empty label selections) do not
//! constrain the result.

use std::{cmp::Reverse, fmt, str::FromStr};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::CatalogSource, products::Product, tags::string::StringTagCollection,
};

pub mod facets;

/// Unknown sort key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key {0:?}; expected newest, price-asc, price-desc or popularity")]
pub struct ParseSortKeyError(String);

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Catalog order, which is recency order
    #[default]
    Newest,

    /// Effective price, cheapest first
    PriceAsc,

    /// Effective price, most expensive first
    PriceDesc,

    /// Rating, highest first
    Popularity,
}

impl SortKey {
    /// The key's wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::Popularity => "popularity",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortKey::Newest),
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            "popularity" => Ok(SortKey::Popularity),
            other => Err(ParseSortKeyError(other.to_string())),
        }
    }
}

/// Inclusive bounds on a product's effective price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    min: Decimal,
    max: Decimal,
}

impl PriceRange {
    /// Range from `min` to `max`, both inclusive.
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Lower bound.
    pub fn min(&self) -> Decimal {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> Decimal {
        self.max
    }

    /// Whether `price` lies within the range.
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Filters and sort order over the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    category: Option<String>,
    brands: StringTagCollection,
    sizes: StringTagCollection,
    colors: StringTagCollection,
    price_range: Option<PriceRange>,
    text: Option<String>,
    sort: SortKey,
}

impl ProductQuery {
    /// A query with no constraints, sorted newest first.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a category (exact match, ignoring case).
    #[must_use]
    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_lowercase());
        self
    }

    /// Allow products of `brand`.
    #[must_use]
    pub fn brand(mut self, brand: &str) -> Self {
        self.brands.add(brand);
        self
    }

    /// Allow products of any of `brands`.
    #[must_use]
    pub fn brands<S: AsRef<str>>(mut self, brands: impl IntoIterator<Item = S>) -> Self {
        for brand in brands {
            self.brands.add(brand.as_ref());
        }
        self
    }

    /// Allow products offered in `size`.
    #[must_use]
    pub fn size(mut self, size: &str) -> Self {
        self.sizes.add(size);
        self
    }

    /// Allow products offered in any of `sizes`.
    #[must_use]
    pub fn sizes<S: AsRef<str>>(mut self, sizes: impl IntoIterator<Item = S>) -> Self {
        for size in sizes {
            self.sizes.add(size.as_ref());
        }
        self
    }

    /// Allow products offered in `color`.
    #[must_use]
    pub fn color(mut self, color: &str) -> Self {
        self.colors.add(color);
        self
    }

    /// Allow products offered in any of `colors`.
    #[must_use]
    pub fn colors<S: AsRef<str>>(mut self, colors: impl IntoIterator<Item = S>) -> Self {
        for color in colors {
            self.colors.add(color.as_ref());
        }
        self
    }

    /// Restrict effective price to `range`.
    #[must_use]
    pub fn price_range(mut self, range: PriceRange) -> Self {
        self.price_range = Some(range);
        self
    }

    /// Require `text` in the name, description, brand, category or a tag (ignoring case).
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_lowercase());
        self
    }

    /// Order results by `sort`.
    #[must_use]
    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// The configured sort key.
    pub fn sort_key(&self) -> SortKey {
        self.sort
    }

    /// Whether any filter is set.
    pub fn has_filters(&self) -> bool {
        self.category.is_some()
            || !self.brands.is_empty()
            || !self.sizes.is_empty()
            || !self.colors.is_empty()
            || self.price_range.is_some()
            || self.text.is_some()
    }

    /// Whether `product` satisfies every filter.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category
            && product.category.to_lowercase() != *category
        {
            return false;
        }

        if !self.brands.is_empty() && !self.brands.contains(&product.brand) {
            return false;
        }

        if !self.sizes.is_empty()
            && !product
                .sizes
                .as_ref()
                .is_some_and(|sizes| sizes.intersects(&self.sizes))
        {
            return false;
        }

        if !self.colors.is_empty()
            && !product
                .colors
                .as_ref()
                .is_some_and(|colors| colors.intersects(&self.colors))
        {
            return false;
        }

        if let Some(range) = &self.price_range
            && !range.contains(product.effective_price())
        {
            return false;
        }

        if let Some(text) = &self.text
            && !matches_text(product, text)
        {
            return false;
        }

        true
    }

    /// Filter `products`, then sort the survivors once.
    ///
    /// The sort is stable: products with equal keys keep their input order.
    pub fn apply<'p>(&self, products: impl IntoIterator<Item = &'p Product>) -> Vec<&'p Product> {
        let mut found: Vec<&Product> = products
            .into_iter()
            .filter(|product| self.matches(product))
            .collect();

        match self.sort {
            SortKey::Newest => {}
            SortKey::PriceAsc => found.sort_by_key(|product| product.effective_price()),
            SortKey::PriceDesc => found.sort_by_key(|product| Reverse(product.effective_price())),
            SortKey::Popularity => found.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        }

        debug!(sort = %self.sort, matches = found.len(), "catalog query applied");

        found
    }

    /// Fetch the full catalog from `source` and apply this query.
    pub async fn fetch(&self, source: &dyn CatalogSource) -> Vec<Product> {
        let products = source.list_all().await;

        self.apply(products.iter()).into_iter().cloned().collect()
    }
}

/// `text` must already be lowercased.
fn matches_text(product: &Product, text: &str) -> bool {
    product.name.to_lowercase().contains(text)
        || product.description.to_lowercase().contains(text)
        || product.brand.to_lowercase().contains(text)
        || product.category.to_lowercase().contains(text)
        || product.tags.any_contains_lowercase(text)
}

//! Product Fixtures

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    products::{Product, VariantList},
    tags::string::StringTagCollection,
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Products in catalog order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product identifier
    pub id: String,

    /// Product name
    pub name: String,

    /// Product description
    #[serde(default)]
    pub description: String,

    /// Product price (e.g., "29.99 USD")
    pub price: String,

    /// Discount (e.g., "15%"), defaults to none
    #[serde(default)]
    pub discount: Option<String>,

    /// Product category
    pub category: String,

    /// Product brand
    pub brand: String,

    /// Average rating
    #[serde(default)]
    pub rating: f64,

    /// Units in stock
    #[serde(default)]
    pub stock: u32,

    /// Product tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Color options
    #[serde(default)]
    pub colors: Option<Vec<String>>,

    /// Size options
    #[serde(default)]
    pub sizes: Option<Vec<String>>,

    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,
}

impl TryFrom<ProductFixture> for Product {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (price, _currency) = parse_price(&fixture.price)?;

        let discount_percentage = fixture
            .discount
            .as_deref()
            .map(parse_discount)
            .transpose()?
            .unwrap_or(Decimal::ZERO);

        if !(0.0..=5.0).contains(&fixture.rating) {
            return Err(FixtureError::InvalidRating(fixture.id, fixture.rating));
        }

        Ok(Product {
            id: fixture.id,
            name: fixture.name,
            description: fixture.description,
            price,
            discount_percentage,
            category: fixture.category,
            brand: fixture.brand,
            rating: fixture.rating,
            stock: fixture.stock,
            tags: StringTagCollection::from(fixture.tags),
            colors: fixture.colors.map(VariantList::from),
            sizes: fixture.sizes.map(VariantList::from),
            images: fixture.images,
        })
    }
}

/// Parse price string (e.g., "29.99 USD") into an amount and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a non-negative decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((amount, parse_currency(currency_code)?))
}

/// Resolve an ISO currency code supported by the storefront.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for unsupported codes.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or if the value is invalid.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let fraction = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?
            / Decimal::ONE_HUNDRED
    } else {
        trimmed
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?
    };

    if fraction.is_sign_negative() {
        return Err(FixtureError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(fraction))
}

/// Parse a product discount (e.g., "15%") into percent points.
///
/// # Errors
///
/// Returns an error unless the value is a `%`-suffixed decimal in `0..=100`.
pub fn parse_discount(s: &str) -> Result<Decimal, FixtureError> {
    let points = s
        .trim()
        .strip_suffix('%')
        .ok_or_else(|| FixtureError::InvalidPercentage(s.to_string()))?
        .trim()
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

    if points < Decimal::ZERO || points > Decimal::ONE_HUNDRED {
        return Err(FixtureError::InvalidPercentage(s.to_string()));
    }

    Ok(points)
}

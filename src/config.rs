//! Store configuration
//!
//! YAML in the same notation as the product fixtures: money as
//! `"100.00 USD"`, rates as `"7%"`.

use std::{fs, path::Path, time::Duration};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    fixtures::{
        FixtureError,
        products::{parse_currency, parse_percentage, parse_price},
    },
    pricing::{Coupon, PricingRules},
};

/// Configuration shipped with the crate.
pub const DEFAULT_CONFIG: &str = include_str!("../config/storefront.yml");

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config text is not valid YAML for [`StoreConfig`]
    #[error("Failed to parse config: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A money or rate value is malformed
    #[error(transparent)]
    Value(#[from] FixtureError),

    /// A money value is not in the store currency
    #[error("{field} must be in {expected}, found {found}")]
    CurrencyMismatch {
        /// Offending setting
        field: &'static str,
        /// Store currency
        expected: String,
        /// Currency found
        found: String,
    },
}

/// Storefront settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// ISO code of the display currency
    pub currency: String,

    /// Simulated catalog latency in milliseconds
    #[serde(default = "default_catalog_latency_ms")]
    pub catalog_latency_ms: u64,

    /// Simulated authentication latency in milliseconds
    #[serde(default = "default_auth_latency_ms")]
    pub auth_latency_ms: u64,

    /// Pricing rules
    pub pricing: PricingConfig,
}

/// Pricing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Subtotal above which shipping is free, e.g. `100.00 USD`
    pub free_shipping_over: String,

    /// Shipping charged otherwise, e.g. `10.00 USD`
    pub flat_shipping: String,

    /// Tax on the subtotal at checkout, e.g. `7%`
    pub tax_rate: String,

    /// Recognized coupon
    pub coupon: CouponConfig,
}

/// Coupon settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CouponConfig {
    /// Code customers enter
    pub code: String,

    /// Share of the subtotal taken off, e.g. `10%`
    pub rate: String,
}

fn default_catalog_latency_ms() -> u64 {
    500
}

fn default_auth_latency_ms() -> u64 {
    1000
}

impl StoreConfig {
    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the text does not parse.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Read configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "loading config");

        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// The embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded YAML is malformed.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_yaml(DEFAULT_CONFIG)
    }

    /// Catalog latency as a duration.
    pub fn catalog_latency(&self) -> Duration {
        Duration::from_millis(self.catalog_latency_ms)
    }

    /// Auth latency as a duration.
    pub fn auth_latency(&self) -> Duration {
        Duration::from_millis(self.auth_latency_ms)
    }

    /// Build the pricing rules.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is malformed or priced in another currency.
    pub fn pricing_rules(&self) -> Result<PricingRules, ConfigError> {
        let currency = parse_currency(&self.currency)?;
        let pricing = &self.pricing;

        Ok(PricingRules::new(
            currency,
            money_in("free_shipping_over", &pricing.free_shipping_over, currency)?,
            money_in("flat_shipping", &pricing.flat_shipping, currency)?,
            parse_percentage(&pricing.tax_rate)?,
            Coupon::new(
                pricing.coupon.code.trim(),
                rate("coupon.rate", &pricing.coupon.rate)?,
            ),
        ))
    }
}

fn money_in(
    field: &'static str,
    value: &str,
    currency: &'static Currency,
) -> Result<Decimal, ConfigError> {
    let (amount, found) = parse_price(value)?;

    if found != currency {
        return Err(ConfigError::CurrencyMismatch {
            field,
            expected: currency.iso_alpha_code.to_string(),
            found: found.iso_alpha_code.to_string(),
        });
    }

    Ok(amount)
}

fn rate(field: &'static str, value: &str) -> Result<Percentage, ConfigError> {
    let parsed = parse_percentage(value)?;

    if parsed * Decimal::ONE > Decimal::ONE {
        return Err(FixtureError::InvalidPercentage(format!("{field}: {value}")).into());
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn embedded_config_matches_default_rules() -> TestResult {
        let config = StoreConfig::embedded()?;
        let rules = config.pricing_rules()?;

        assert_eq!(config.catalog_latency(), Duration::from_millis(500));
        assert_eq!(config.auth_latency(), Duration::from_secs(1));
        assert_eq!(rules.currency(), USD);
        assert_eq!(rules.coupon().code(), "discount10");
        assert_eq!(rules.shipping_for(Decimal::ONE_HUNDRED), Decimal::TEN);
        assert_eq!(rules.shipping_for(Decimal::new(10001, 2)), Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn latencies_default_when_omitted() -> TestResult {
        let config = StoreConfig::from_yaml(
            "currency: USD\npricing:\n  free_shipping_over: 50 USD\n  flat_shipping: 5 USD\n  tax_rate: 0%\n  coupon:\n    code: save\n    rate: 5%\n",
        )?;

        assert_eq!(config.catalog_latency_ms, 500);
        assert_eq!(config.auth_latency_ms, 1000);
        assert_eq!(config.pricing_rules()?.shipping_for(Decimal::new(50, 0)), Decimal::new(5, 0));

        Ok(())
    }

    #[test]
    fn foreign_currency_amounts_are_rejected() -> TestResult {
        let mut config = StoreConfig::embedded()?;
        config.pricing.flat_shipping = "10.00 GBP".to_string();

        assert!(matches!(
            config.pricing_rules(),
            Err(ConfigError::CurrencyMismatch { field: "flat_shipping", .. })
        ));

        Ok(())
    }

    #[test]
    fn coupon_rate_above_whole_is_rejected() -> TestResult {
        let mut config = StoreConfig::embedded()?;
        config.pricing.coupon.rate = "150%".to_string();

        assert!(matches!(
            config.pricing_rules(),
            Err(ConfigError::Value(FixtureError::InvalidPercentage(_)))
        ));

        Ok(())
    }
}

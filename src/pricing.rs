//! Pricing
//!
//! Cart totals under the storefront's fixed rule set: an optional coupon
//! taking a flat share of the subtotal, flat-rate shipping waived above a
//! threshold, and tax on the subtotal at checkout.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{
    Money,
    iso::{Currency, USD},
};

use crate::cart::Cart;

/// A fixed coupon code granting a percentage off the subtotal.
#[derive(Debug, Clone)]
pub struct Coupon {
    code: String,
    rate: Percentage,
}

impl Coupon {
    /// Coupon `code` worth `rate` of the subtotal.
    pub fn new(code: impl Into<String>, rate: Percentage) -> Self {
        Self {
            code: code.into(),
            rate,
        }
    }

    /// The configured code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Share of the subtotal taken off.
    pub fn rate(&self) -> Percentage {
        self.rate
    }

    /// Whether `code` redeems this coupon, ignoring case and surrounding whitespace.
    pub fn matches(&self, code: &str) -> bool {
        code.trim().to_lowercase() == self.code.to_lowercase()
    }
}

/// Pricing rules
#[derive(Debug, Clone)]
pub struct PricingRules {
    currency: &'static Currency,
    free_shipping_over: Decimal,
    flat_shipping: Decimal,
    tax_rate: Percentage,
    coupon: Coupon,
}

impl PricingRules {
    /// Create a rule set.
    pub fn new(
        currency: &'static Currency,
        free_shipping_over: Decimal,
        flat_shipping: Decimal,
        tax_rate: Percentage,
        coupon: Coupon,
    ) -> Self {
        Self {
            currency,
            free_shipping_over,
            flat_shipping,
            tax_rate,
            coupon,
        }
    }

    /// Display currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// The recognized coupon.
    pub fn coupon(&self) -> &Coupon {
        &self.coupon
    }

    /// Shipping charged on `subtotal`; free strictly above the threshold.
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.free_shipping_over {
            Decimal::ZERO
        } else {
            self.flat_shipping
        }
    }

    /// Compute the totals of `cart`.
    pub fn totals(&self, cart: &Cart, coupon_applied: bool) -> CartTotals {
        let subtotal = cart.subtotal();

        let discount = if coupon_applied {
            self.coupon.rate * subtotal
        } else {
            Decimal::ZERO
        };

        CartTotals {
            subtotal,
            discount,
            shipping: self.shipping_for(subtotal),
            tax: self.tax_rate * subtotal,
            currency: self.currency,
        }
    }
}

impl Default for PricingRules {
    fn default() -> Self {
        Self::new(
            USD,
            Decimal::ONE_HUNDRED,
            Decimal::TEN,
            Percentage::from(Decimal::new(7, 2)),
            Coupon::new("discount10", Percentage::from(Decimal::new(10, 2))),
        )
    }
}

/// Derived monetary totals, at full precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals {
    /// Sum of effective price times quantity
    pub subtotal: Decimal,

    /// Coupon discount
    pub discount: Decimal,

    /// Shipping charge
    pub shipping: Decimal,

    /// Tax on the subtotal, charged at checkout
    pub tax: Decimal,

    /// Display currency
    pub currency: &'static Currency,
}

impl CartTotals {
    /// Cart summary total: `subtotal - discount + shipping` (tax is added at checkout).
    pub fn summary_total(&self) -> Decimal {
        self.subtotal - self.discount + self.shipping
    }

    /// Checkout total: `subtotal - discount + shipping + tax`.
    pub fn checkout_total(&self) -> Decimal {
        self.summary_total() + self.tax
    }

    /// Whether shipping is waived.
    pub fn free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }

    /// Format `amount` for display in this currency.
    pub fn display(&self, amount: Decimal) -> String {
        format_money(amount, self.currency)
    }
}

/// Round a monetary amount to cents for display.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format `amount` rounded to cents, e.g. `$46.00`.
pub fn format_money(amount: Decimal, currency: &'static Currency) -> String {
    Money::from_decimal(round_money(amount), currency).to_string()
}

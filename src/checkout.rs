//! Checkout
//!
//! A three step form: shipping address, payment details, then review.
//! Placing the order snapshots the cart into an [`Order`] and empties it.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{auth::User, cart::LineItem, store::CartStore};

const GUEST_USER_ID: &str = "guest";

/// Errors raised while moving through checkout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// A required form field was blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The operation belongs to another step.
    #[error("expected the {expected} step, currently at {actual}")]
    WrongStep {
        /// Step the operation needs
        expected: CheckoutStep,
        /// Step the checkout is at
        actual: CheckoutStep,
    },

    /// Terms and conditions were not accepted.
    #[error("terms and conditions must be accepted")]
    TermsNotAccepted,

    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,
}

/// Checkout form step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CheckoutStep {
    /// Shipping address entry
    #[default]
    Shipping,

    /// Payment details entry
    Payment,

    /// Final review
    Review,
}

impl CheckoutStep {
    fn previous(self) -> Self {
        match self {
            Self::Shipping | Self::Payment => Self::Shipping,
            Self::Review => Self::Payment,
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shipping => "shipping",
            Self::Payment => "payment",
            Self::Review => "review",
        })
    }
}

/// Delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Recipient
    pub full_name: String,

    /// Street and number
    pub street_address: String,

    /// City
    pub city: String,

    /// State or region
    pub state: String,

    /// Postal code
    pub postal_code: String,

    /// Country
    pub country: String,

    /// Contact phone
    pub phone: String,
}

impl ShippingAddress {
    fn validate(&self) -> Result<(), CheckoutError> {
        required("full name", &self.full_name)?;
        required("street address", &self.street_address)?;
        required("city", &self.city)?;
        required("state", &self.state)?;
        required("postal code", &self.postal_code)?;
        required("country", &self.country)?;
        required("phone", &self.phone)
    }
}

/// Card details. Never persisted; orders keep only a masked description.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PaymentDetails {
    /// Name on card
    pub card_name: String,

    /// Card number
    pub card_number: String,

    /// Expiry date, e.g. `12/27`
    pub expiry: String,

    /// Security code
    pub cvv: String,
}

impl PaymentDetails {
    fn validate(&self) -> Result<(), CheckoutError> {
        required("name on card", &self.card_name)?;
        required("card number", &self.card_number)?;
        required("expiry date", &self.expiry)?;
        required("CVV", &self.cvv)
    }

    /// Card description safe to display, e.g. `Card ending in 4242`.
    pub fn masked(&self) -> String {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();

        let last_four: String = digits.iter().skip(digits.len().saturating_sub(4)).collect();

        format!("Card ending in {last_four}")
    }
}

impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("card_name", &self.card_name)
            .field("card_number", &self.masked())
            .finish_non_exhaustive()
    }
}

/// Order lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, awaiting processing
    #[default]
    Pending,

    /// Being prepared
    Processing,

    /// Handed to the carrier
    Shipped,

    /// Received by the customer
    Delivered,

    /// Cancelled
    Cancelled,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier
    pub id: Uuid,

    /// Purchasing user, or `guest`
    pub user_id: String,

    /// Lines as they were in the cart
    pub items: Vec<LineItem>,

    /// Lifecycle state
    pub status: OrderStatus,

    /// Amount charged, including tax
    pub total: Decimal,

    /// Delivery address
    pub shipping_address: ShippingAddress,

    /// Masked payment description
    pub payment_method: String,

    /// Creation time
    pub created_at: Timestamp,

    /// Last update time
    pub updated_at: Timestamp,
}

/// Checkout progress.
#[derive(Debug, Default)]
pub struct Checkout {
    step: CheckoutStep,
    shipping: Option<ShippingAddress>,
    payment: Option<PaymentDetails>,
}

impl Checkout {
    /// Start at the shipping step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step.
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Submitted shipping address.
    pub fn shipping(&self) -> Option<&ShippingAddress> {
        self.shipping.as_ref()
    }

    /// Submitted payment details.
    pub fn payment(&self) -> Option<&PaymentDetails> {
        self.payment.as_ref()
    }

    /// Submit the shipping form and advance to payment.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::WrongStep`]: not at the shipping step.
    /// - [`CheckoutError::MissingField`]: a field is blank.
    pub fn submit_shipping(&mut self, address: ShippingAddress) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Shipping)?;

        address.validate()?;

        self.shipping = Some(address);
        self.step = CheckoutStep::Payment;

        debug!(step = %self.step, "shipping accepted");

        Ok(())
    }

    /// Submit the payment form and advance to review.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::WrongStep`]: not at the payment step.
    /// - [`CheckoutError::MissingField`]: a field is blank.
    pub fn submit_payment(&mut self, payment: PaymentDetails) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Payment)?;

        payment.validate()?;

        self.payment = Some(payment);
        self.step = CheckoutStep::Review;

        debug!(step = %self.step, "payment accepted");

        Ok(())
    }

    /// Return to the previous step, keeping entered data.
    pub fn back(&mut self) {
        self.step = self.step.previous();
    }

    /// Place the order for the cart in `store`, then empty the cart.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::WrongStep`]: not at the review step.
    /// - [`CheckoutError::TermsNotAccepted`]: `agree_to_terms` is false.
    /// - [`CheckoutError::EmptyCart`]: nothing to order.
    #[instrument(skip(self, store, user))]
    pub fn place_order(
        &mut self,
        store: &mut CartStore,
        user: Option<&User>,
        agree_to_terms: bool,
    ) -> Result<Order, CheckoutError> {
        self.expect_step(CheckoutStep::Review)?;

        if !agree_to_terms {
            return Err(CheckoutError::TermsNotAccepted);
        }

        if store.cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let (Some(shipping_address), Some(payment)) = (self.shipping.clone(), self.payment.clone())
        else {
            return Err(CheckoutError::WrongStep {
                expected: CheckoutStep::Shipping,
                actual: self.step,
            });
        };

        let now = Timestamp::now();

        let order = Order {
            id: Uuid::now_v7(),
            user_id: user.map_or_else(|| GUEST_USER_ID.to_string(), |user| user.id.clone()),
            items: store.cart().items().to_vec(),
            status: OrderStatus::Pending,
            total: store.totals().checkout_total(),
            shipping_address,
            payment_method: payment.masked(),
            created_at: now,
            updated_at: now,
        };

        store.clear();
        *self = Self::new();

        info!(order = %order.id, total = %order.total, "order placed");

        Ok(order)
    }

    fn expect_step(&self, expected: CheckoutStep) -> Result<(), CheckoutError> {
        if self.step != expected {
            return Err(CheckoutError::WrongStep {
                expected,
                actual: self.step,
            });
        }

        Ok(())
    }
}

fn required(field: &'static str, value: &str) -> Result<(), CheckoutError> {
    if value.trim().is_empty() {
        return Err(CheckoutError::MissingField(field));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use testresult::TestResult;

    use super::*;
    use crate::{
        cart::VariantSelection, pricing::PricingRules, products::test_support::product,
        storage::MemoryStore,
    };

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Ada Lovelace".to_string(),
            street_address: "12 St James's Square".to_string(),
            city: "London".to_string(),
            state: "London".to_string(),
            postal_code: "SW1Y 4JH".to_string(),
            country: "UK".to_string(),
            phone: "+44 20 7946 0000".to_string(),
        }
    }

    fn card() -> PaymentDetails {
        PaymentDetails {
            card_name: "A Lovelace".to_string(),
            card_number: "4242 4242 4242 4242".to_string(),
            expiry: "12/27".to_string(),
            cvv: "123".to_string(),
        }
    }

    fn stocked_store() -> Result<CartStore, crate::cart::CartError> {
        let mut store = CartStore::open(Arc::new(MemoryStore::new()), PricingRules::default());
        store.add_item(
            &product("1", Decimal::new(40, 0), Decimal::ZERO),
            1,
            VariantSelection::none(),
        )?;
        Ok(store)
    }

    #[test]
    fn steps_advance_and_go_back() -> TestResult {
        let mut checkout = Checkout::new();

        checkout.submit_shipping(address())?;
        assert_eq!(checkout.step(), CheckoutStep::Payment);

        checkout.submit_payment(card())?;
        assert_eq!(checkout.step(), CheckoutStep::Review);
        assert_eq!(
            checkout.payment().map(PaymentDetails::masked).as_deref(),
            Some("Card ending in 4242")
        );

        checkout.back();
        assert_eq!(checkout.step(), CheckoutStep::Payment);
        checkout.back();
        checkout.back();
        assert_eq!(checkout.step(), CheckoutStep::Shipping);
        assert!(checkout.shipping().is_some());

        Ok(())
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut checkout = Checkout::new();

        let result = checkout.submit_shipping(ShippingAddress {
            city: "  ".to_string(),
            ..address()
        });

        assert_eq!(result, Err(CheckoutError::MissingField("city")));
        assert_eq!(checkout.step(), CheckoutStep::Shipping);
    }

    #[test]
    fn payment_before_shipping_is_wrong_step() {
        let mut checkout = Checkout::new();

        assert_eq!(
            checkout.submit_payment(card()),
            Err(CheckoutError::WrongStep {
                expected: CheckoutStep::Payment,
                actual: CheckoutStep::Shipping,
            })
        );
    }

    #[test]
    fn place_order_requires_terms() -> TestResult {
        let mut store = stocked_store()?;
        let mut checkout = Checkout::new();
        checkout.submit_shipping(address())?;
        checkout.submit_payment(card())?;

        assert_eq!(
            checkout.place_order(&mut store, None, false),
            Err(CheckoutError::TermsNotAccepted)
        );
        assert_eq!(store.item_count(), 1);

        Ok(())
    }

    #[test]
    fn place_order_snapshots_and_clears_cart() -> TestResult {
        let mut store = stocked_store()?;
        let mut checkout = Checkout::new();
        checkout.submit_shipping(address())?;
        checkout.submit_payment(card())?;

        let order = checkout.place_order(&mut store, None, true)?;

        assert_eq!(order.user_id, "guest");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
        // 40 + 10 shipping + 2.80 tax
        assert_eq!(order.total, Decimal::new(5280, 2));
        assert_eq!(order.payment_method, "Card ending in 4242");
        assert!(store.cart().is_empty());
        assert_eq!(checkout.step(), CheckoutStep::Shipping);

        Ok(())
    }

    #[test]
    fn masked_card_never_leaks_full_number() {
        let rendered = format!("{:?}", card());

        assert!(!rendered.contains("4242 4242"));
        assert!(rendered.contains("Card ending in 4242"));
    }
}

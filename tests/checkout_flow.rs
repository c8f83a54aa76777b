//! End-to-end checkout: cart, session and order placement.

use std::{sync::Arc, time::Duration};

use rust_decimal::Decimal;
use storefront::{
    auth::Session,
    cart::VariantSelection,
    checkout::{Checkout, CheckoutError, CheckoutStep, OrderStatus, PaymentDetails, ShippingAddress},
    fixtures::Fixture,
    pricing::{PricingRules, round_money},
    storage::{CART_KEY, KeyValueStore, MemoryStore},
    store::CartStore,
};
use testresult::TestResult;

fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Grace Hopper".to_string(),
        street_address: "1 Navy Way".to_string(),
        city: "Arlington".to_string(),
        state: "VA".to_string(),
        postal_code: "22202".to_string(),
        country: "US".to_string(),
        phone: "555-0100".to_string(),
    }
}

fn card() -> PaymentDetails {
    PaymentDetails {
        card_name: "G Hopper".to_string(),
        card_number: "4000 0000 0000 1234".to_string(),
        expiry: "01/30".to_string(),
        cvv: "321".to_string(),
    }
}

#[tokio::test]
async fn signed_in_user_places_order_with_coupon_and_tax() -> TestResult {
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let catalog = Fixture::seed()?.catalog();
    let wallet = catalog.get("9")?;

    let mut session = Session::restore(Arc::clone(&storage)).with_latency(Duration::ZERO);
    session.sign_in("grace@example.com", "cobol").await?;

    let mut store = CartStore::open(Arc::clone(&storage), PricingRules::default());
    store.add_item(wallet, 2, VariantSelection::none().color("brown"))?;
    store.apply_coupon("discount10")?;

    let mut checkout = Checkout::new();
    checkout.submit_shipping(address())?;
    checkout.submit_payment(card())?;

    assert_eq!(checkout.step(), CheckoutStep::Review);

    let order = checkout.place_order(&mut store, session.user(), true)?;

    // 91.98 - 9.198 + 10 + 6.4386
    assert_eq!(round_money(order.total), Decimal::new(9922, 2));
    assert_eq!(order.user_id, "1");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.first().map(|item| item.quantity), Some(2));
    assert_eq!(order.payment_method, "Card ending in 1234");
    assert_eq!(order.shipping_address, address());

    assert!(store.cart().is_empty());
    assert_eq!(storage.get(CART_KEY)?, Some("[]".to_string()));

    Ok(())
}

#[test]
fn guest_checkout_of_empty_cart_is_refused() -> TestResult {
    let mut store = CartStore::open(Arc::new(MemoryStore::new()), PricingRules::default());
    let mut checkout = Checkout::new();

    checkout.submit_shipping(address())?;
    checkout.submit_payment(card())?;

    assert_eq!(
        checkout.place_order(&mut store, None, true),
        Err(CheckoutError::EmptyCart)
    );

    Ok(())
}

#[test]
fn order_cannot_be_placed_before_review() -> TestResult {
    let catalog = Fixture::seed()?.catalog();
    let mut store = CartStore::open(Arc::new(MemoryStore::new()), PricingRules::default());
    store.add_item(catalog.get("6")?, 1, VariantSelection::none().color("navy"))?;

    let mut checkout = Checkout::new();
    checkout.submit_shipping(address())?;

    assert_eq!(
        checkout.place_order(&mut store, None, true),
        Err(CheckoutError::WrongStep {
            expected: CheckoutStep::Review,
            actual: CheckoutStep::Payment,
        })
    );
    assert_eq!(store.item_count(), 1);

    Ok(())
}

#[test]
fn order_serializes_with_camel_case_fields() -> TestResult {
    let catalog = Fixture::seed()?.catalog();
    let mut store = CartStore::open(Arc::new(MemoryStore::new()), PricingRules::default());
    store.add_item(catalog.get("11")?, 1, VariantSelection::none().color("olive"))?;

    let mut checkout = Checkout::new();
    checkout.submit_shipping(address())?;
    checkout.submit_payment(card())?;

    let order = checkout.place_order(&mut store, None, true)?;
    let json = serde_json::to_string(&order)?;

    assert!(json.contains("\"userId\":\"guest\""));
    assert!(json.contains("\"status\":\"pending\""));
    assert!(json.contains("\"shippingAddress\""));
    assert!(!json.contains("4000 0000"));

    Ok(())
}

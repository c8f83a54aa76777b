use std::{
    io::{self, Write},
    sync::Arc,
};

use clap::Args;
use storefront::{
    auth::Session,
    checkout::{Checkout, PaymentDetails, ShippingAddress},
    receipt::{Receipt, TotalsView},
    store::CartStore,
};

use crate::cli::Context;

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Recipient's full name
    #[arg(long)]
    full_name: String,

    /// Street address
    #[arg(long)]
    street_address: String,

    /// City
    #[arg(long)]
    city: String,

    /// State or region
    #[arg(long)]
    state: String,

    /// Postal code
    #[arg(long)]
    postal_code: String,

    /// Country
    #[arg(long)]
    country: String,

    /// Contact phone
    #[arg(long)]
    phone: String,

    /// Name on card
    #[arg(long)]
    card_name: String,

    /// Card number
    #[arg(long, env = "STOREFRONT_CARD_NUMBER", hide_env_values = true)]
    card_number: String,

    /// Card expiry, e.g. 12/27
    #[arg(long)]
    expiry: String,

    /// Card security code
    #[arg(long, env = "STOREFRONT_CARD_CVV", hide_env_values = true)]
    cvv: String,

    /// Coupon code
    #[arg(long)]
    coupon: Option<String>,

    /// Accept the terms and conditions
    #[arg(long)]
    agree_to_terms: bool,
}

pub(crate) fn run(ctx: &Context, args: CheckoutArgs) -> anyhow::Result<()> {
    let mut store = CartStore::open(Arc::clone(&ctx.storage), ctx.rules.clone());
    let session = Session::restore(Arc::clone(&ctx.storage));
    let mut out = io::stdout();

    if let Some(code) = &args.coupon {
        store.apply_coupon(code)?;
    }

    let mut checkout = Checkout::new();

    checkout.submit_shipping(ShippingAddress {
        full_name: args.full_name,
        street_address: args.street_address,
        city: args.city,
        state: args.state,
        postal_code: args.postal_code,
        country: args.country,
        phone: args.phone,
    })?;

    checkout.submit_payment(PaymentDetails {
        card_name: args.card_name,
        card_number: args.card_number,
        expiry: args.expiry,
        cvv: args.cvv,
    })?;

    Receipt::new(store.cart(), store.totals(), TotalsView::Checkout).write_to(&mut out)?;

    if let Some(payment) = checkout.payment() {
        writeln!(out, "Paying with {}", payment.masked())?;
    }

    let order = checkout.place_order(&mut store, session.user(), args.agree_to_terms)?;

    writeln!(out, "{}", serde_json::to_string_pretty(&order)?)?;

    Ok(())
}

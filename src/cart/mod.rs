//! Cart
//!
//! An ordered list of line items. A line item is identified by the
//! `(product id, size, color)` slot it occupies; no two items share a slot.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::products::{Product, VariantAxis};

/// Errors related to cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity below 1 (or too large to store).
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    /// Adding to the line would exceed the largest storable quantity (line id, units requested).
    #[error("line {0} cannot hold {1} more units")]
    QuantityOverflow(LineItemId, i64),

    /// The product defines a variant axis but none was chosen (product id, axis).
    #[error("product {0} requires a {1} selection")]
    MissingVariant(String, VariantAxis),

    /// The chosen label is not offered by the product (product id, axis, label).
    #[error("product {0} has no {1} {2:?}")]
    UnknownVariant(String, VariantAxis, String),

    /// The product has no stock left (product id).
    #[error("product {0} is out of stock")]
    OutOfStock(String),

    /// Coupon code not recognized.
    #[error("invalid coupon code {0:?}")]
    InvalidCoupon(String),
}

/// Line item identifier, generated per add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(Uuid);

impl LineItemId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for LineItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for LineItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Size and color chosen when adding a product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSelection {
    /// Chosen size
    pub size: Option<String>,

    /// Chosen color
    pub color: Option<String>,
}

impl VariantSelection {
    /// No variant chosen.
    pub fn none() -> Self {
        Self::default()
    }

    /// Choose a size.
    #[must_use]
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Choose a color.
    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// The product's first size and color, as preselected on a product page.
    pub fn defaults_for(product: &Product) -> Self {
        Self {
            size: product
                .variants(VariantAxis::Size)
                .and_then(|list| list.first())
                .map(str::to_string),
            color: product
                .variants(VariantAxis::Color)
                .and_then(|list| list.first())
                .map(str::to_string),
        }
    }

    fn get(&self, axis: VariantAxis) -> Option<&str> {
        match axis {
            VariantAxis::Size => self.size.as_deref(),
            VariantAxis::Color => self.color.as_deref(),
        }
    }

    /// Check this selection against the product's variant lists.
    ///
    /// # Errors
    ///
    /// - [`CartError::MissingVariant`]: the product offers an axis but nothing was chosen.
    /// - [`CartError::UnknownVariant`]: the chosen label is not offered.
    pub fn validate(&self, product: &Product) -> Result<(), CartError> {
        for axis in [VariantAxis::Size, VariantAxis::Color] {
            match (product.variants(axis), self.get(axis)) {
                (Some(_), None) => {
                    return Err(CartError::MissingVariant(product.id.clone(), axis));
                }
                (offered, Some(label)) if !offered.is_some_and(|list| list.contains(label)) => {
                    return Err(CartError::UnknownVariant(
                        product.id.clone(),
                        axis,
                        label.to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// A product in the cart with a quantity and chosen variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Line identifier
    pub id: LineItemId,

    /// Snapshot of the product added
    pub product: Product,

    /// Units, always at least 1
    pub quantity: u32,

    /// Chosen size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Chosen color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl LineItem {
    /// Effective price of one unit.
    pub fn unit_price(&self) -> Decimal {
        self.product.effective_price()
    }

    /// Effective price times quantity.
    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }

    /// Whether this item occupies the `(product, size, color)` slot.
    pub fn occupies(&self, product_id: &str, size: Option<&str>, color: Option<&str>) -> bool {
        self.product.id == product_id && self.size.as_deref() == size && self.color.as_deref() == color
    }

    /// Human readable variant, e.g. `M / navy`.
    pub fn variant_label(&self) -> String {
        match (&self.size, &self.color) {
            (Some(size), Some(color)) => format!("{size} / {color}"),
            (Some(label), None) | (None, Some(label)) => label.clone(),
            (None, None) => String::new(),
        }
    }
}

/// Cart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from stored line items, merging any that share a slot.
    ///
    /// Lines reusing an id already taken get a fresh one. Units that would
    /// overflow a merged line are dropped with a warning.
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut cart = Self::new();

        for mut item in items {
            if item.quantity == 0 {
                continue;
            }

            if let Some(existing) =
                cart.slot_mut(&item.product.id, item.size.as_deref(), item.color.as_deref())
            {
                match existing.quantity.checked_add(item.quantity) {
                    Some(total) => existing.quantity = total,
                    None => warn!(line = %existing.id, units = item.quantity, "dropping overflowing units"),
                }

                continue;
            }

            if cart.get(item.id).is_some() {
                item.id = LineItemId::new();
            }

            cart.items.push(item);
        }

        cart
    }

    /// Add `quantity` units of `product` in the chosen variant.
    ///
    /// Increments the existing line when the slot is taken, otherwise appends
    /// a new line. Returns the id of the affected line.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is below 1.
    /// - [`CartError::OutOfStock`]: the product's stock is zero.
    /// - [`CartError::QuantityOverflow`]: the merged line would exceed
    ///   `u32::MAX` units. The cart is left unchanged.
    /// - [`CartError::MissingVariant`] / [`CartError::UnknownVariant`]: see
    ///   [`VariantSelection::validate`].
    pub fn add(
        &mut self,
        product: &Product,
        quantity: i64,
        variant: VariantSelection,
    ) -> Result<LineItemId, CartError> {
        let units = positive_quantity(quantity)?;

        if !product.in_stock() {
            return Err(CartError::OutOfStock(product.id.clone()));
        }

        variant.validate(product)?;

        if let Some(existing) =
            self.slot_mut(&product.id, variant.size.as_deref(), variant.color.as_deref())
        {
            existing.quantity = existing
                .quantity
                .checked_add(units)
                .ok_or(CartError::QuantityOverflow(existing.id, quantity))?;

            return Ok(existing.id);
        }

        let id = LineItemId::new();

        self.items.push(LineItem {
            id,
            product: product.clone(),
            quantity: units,
            size: variant.size,
            color: variant.color,
        });

        Ok(id)
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove(&mut self, id: LineItemId) -> bool {
        let before = self.items.len();

        self.items.retain(|item| item.id != id);

        self.items.len() != before
    }

    /// Set a line's quantity exactly.
    ///
    /// Quantities of zero or less leave the cart untouched, as do unknown ids.
    /// Returns whether the cart changed.
    pub fn update_quantity(&mut self, id: LineItemId, quantity: i64) -> bool {
        let Ok(units) = positive_quantity(quantity) else {
            return false;
        };

        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) if item.quantity != units => {
                item.quantity = units;
                true
            }
            _ => false,
        }
    }

    /// Empty the cart. Returns whether it held anything.
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();

        self.items.clear();

        had_items
    }

    /// Look up a line.
    pub fn get(&self, id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Lines in the order they were added.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over the lines.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Sum of line totals at full precision.
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Total units across every line.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn slot_mut(
        &mut self,
        product_id: &str,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Option<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|item| item.occupies(product_id, size, color))
    }
}

fn positive_quantity(quantity: i64) -> Result<u32, CartError> {
    if quantity < 1 {
        return Err(CartError::InvalidQuantity(quantity));
    }

    u32::try_from(quantity).map_err(|_err| CartError::InvalidQuantity(quantity))
}

//! Products

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::tags::string::StringTagCollection;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Product
///
/// Products are built once from the seed catalog and never mutated. Field
/// names serialize in camelCase (`discountPercentage`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier
    pub id: String,

    /// Product name
    pub name: String,

    /// Long-form description
    pub description: String,

    /// List price
    pub price: Decimal,

    /// Discount in percent points (0-100)
    pub discount_percentage: Decimal,

    /// Category, e.g. "men" or "accessories"
    pub category: String,

    /// Brand name
    pub brand: String,

    /// Average rating (0.0-5.0)
    pub rating: f64,

    /// Units available
    pub stock: u32,

    /// Product tags, searched by free-text queries
    pub tags: StringTagCollection,

    /// Selectable colors, absent when the product has no color axis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<VariantList>,

    /// Selectable sizes, absent when the product has no size axis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<VariantList>,

    /// Image URLs, first is the primary image
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Price after applying the product's discount percentage.
    ///
    /// Computed at full precision; round only for display.
    pub fn effective_price(&self) -> Decimal {
        if self.discount_percentage > Decimal::ZERO {
            self.price * (Decimal::ONE - self.discount_percentage / Decimal::ONE_HUNDRED)
        } else {
            self.price
        }
    }

    /// Whether the product is discounted.
    pub fn is_discounted(&self) -> bool {
        self.discount_percentage > Decimal::ZERO
    }

    /// Variant labels for the given axis, if the product defines any.
    pub fn variants(&self, axis: VariantAxis) -> Option<&VariantList> {
        match axis {
            VariantAxis::Size => self.sizes.as_ref(),
            VariantAxis::Color => self.colors.as_ref(),
        }
        .filter(|list| !list.is_empty())
    }

    /// Whether the product is in stock.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A variant dimension a product may be offered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantAxis {
    /// Garment or shoe size
    Size,

    /// Color
    Color,
}

impl fmt::Display for VariantAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantAxis::Size => f.write_str("size"),
            VariantAxis::Color => f.write_str("color"),
        }
    }
}

/// Ordered list of selectable variant labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantList {
    labels: SmallVec<[String; 8]>,
}

impl VariantList {
    /// Create a variant list from string slices, keeping their order.
    pub fn from_strs(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|label| (*label).to_string()).collect(),
        }
    }

    /// Whether `label` is one of the listed variants.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|candidate| candidate == label)
    }

    /// Whether any listed variant is in `selection`.
    pub fn intersects(&self, selection: &StringTagCollection) -> bool {
        self.labels.iter().any(|label| selection.contains(label))
    }

    /// The first listed variant, used as the default selection.
    pub fn first(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    /// Iterate over the labels in listed order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl From<Vec<String>> for VariantList {
    fn from(labels: Vec<String>) -> Self {
        Self {
            labels: SmallVec::from_vec(labels),
        }
    }
}

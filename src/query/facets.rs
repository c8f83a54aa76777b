//! Filter facets: the selectable brands, sizes and colors of a product list.

use rustc_hash::FxHashSet;

use crate::products::Product;

/// Distinct filter options, each in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    /// Brands
    pub brands: Vec<String>,

    /// Size labels
    pub sizes: Vec<String>,

    /// Color labels
    pub colors: Vec<String>,
}

impl Facets {
    /// Collect the facets of `products`.
    pub fn from_products<'p>(products: impl IntoIterator<Item = &'p Product>) -> Self {
        let mut brands = Distinct::default();
        let mut sizes = Distinct::default();
        let mut colors = Distinct::default();

        for product in products {
            brands.push(&product.brand);

            for size in product.sizes.iter().flat_map(|list| list.iter()) {
                sizes.push(size);
            }

            for color in product.colors.iter().flat_map(|list| list.iter()) {
                colors.push(color);
            }
        }

        Self {
            brands: brands.values,
            sizes: sizes.values,
            colors: colors.values,
        }
    }
}

#[derive(Default)]
struct Distinct {
    seen: FxHashSet<String>,
    values: Vec<String>,
}

impl Distinct {
    fn push(&mut self, value: &str) {
        if self.seen.insert(value.to_string()) {
            self.values.push(value.to_string());
        }
    }
}

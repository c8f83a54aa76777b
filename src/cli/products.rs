use std::io::{self, Write};

use clap::Args;
use rust_decimal::Decimal;
use storefront::{
    catalog::CatalogSource,
    pricing::format_money,
    products::Product,
    query::{PriceRange, ProductQuery, SortKey, facets::Facets},
};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use crate::cli::Context;

#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    /// Category, e.g. men, women, accessories
    #[arg(long)]
    category: Option<String>,

    /// Brand (repeatable)
    #[arg(long = "brand")]
    brands: Vec<String>,

    /// Size label (repeatable)
    #[arg(long = "size")]
    sizes: Vec<String>,

    /// Color label (repeatable)
    #[arg(long = "color")]
    colors: Vec<String>,

    /// Lowest effective price
    #[arg(long, requires = "max_price")]
    min_price: Option<Decimal>,

    /// Highest effective price
    #[arg(long, requires = "min_price")]
    max_price: Option<Decimal>,

    /// Free-text search over name, description and tags
    #[arg(short, long)]
    query: Option<String>,

    /// newest, price-asc, price-desc or popularity
    #[arg(short, long, default_value_t = SortKey::Newest)]
    sort: SortKey,
}

impl ListArgs {
    fn query(&self) -> ProductQuery {
        let mut query = ProductQuery::new()
            .brands(&self.brands)
            .sizes(&self.sizes)
            .colors(&self.colors)
            .sort(self.sort);

        if let Some(category) = &self.category {
            query = query.category(category);
        }

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            query = query.price_range(PriceRange::new(min, max));
        }

        if let Some(text) = &self.query {
            query = query.text(text);
        }

        query
    }
}

#[derive(Debug, Args)]
pub(crate) struct ShowArgs {
    /// Product id
    id: String,
}

pub(crate) async fn list(ctx: &Context, args: ListArgs) -> anyhow::Result<()> {
    let products = args.query().fetch(&ctx.catalog).await;
    let mut out = io::stdout();

    if products.is_empty() {
        writeln!(out, "No products match.")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Id", "Name", "Brand", "Price", "Rating", "Stock"]);

    for product in &products {
        builder.push_record([
            product.id.clone(),
            product.name.clone(),
            product.brand.clone(),
            price_cell(ctx, product),
            format!("{:.1}", product.rating),
            product.stock.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "{table}")?;
    writeln!(out, "{} product(s)", products.len())?;

    Ok(())
}

pub(crate) async fn show(ctx: &Context, args: ShowArgs) -> anyhow::Result<()> {
    let product = ctx.catalog.get_by_id(&args.id).await?;
    let mut out = io::stdout();

    writeln!(out, "{} ({})", product.name, product.brand)?;
    writeln!(out, "{}", product.description)?;
    writeln!(out, "Price:    {}", price_cell(ctx, &product))?;
    writeln!(out, "Rating:   {:.1}", product.rating)?;
    writeln!(
        out,
        "Stock:    {}",
        if product.in_stock() {
            product.stock.to_string()
        } else {
            "out of stock".to_string()
        }
    )?;

    if let Some(sizes) = &product.sizes {
        writeln!(out, "Sizes:    {}", sizes.iter().collect::<Vec<_>>().join(", "))?;
    }

    if let Some(colors) = &product.colors {
        writeln!(out, "Colors:   {}", colors.iter().collect::<Vec<_>>().join(", "))?;
    }

    writeln!(out, "Tags:     {}", product.tags.iter().collect::<Vec<_>>().join(", "))?;

    Ok(())
}

pub(crate) async fn facets(ctx: &Context) -> anyhow::Result<()> {
    let products = ctx.catalog.list_all().await;
    let facets = Facets::from_products(&products);
    let mut out = io::stdout();

    writeln!(out, "Brands: {}", facets.brands.join(", "))?;
    writeln!(out, "Sizes:  {}", facets.sizes.join(", "))?;
    writeln!(out, "Colors: {}", facets.colors.join(", "))?;

    Ok(())
}

fn price_cell(ctx: &Context, product: &Product) -> String {
    let currency = ctx.rules.currency();
    let price = format_money(product.effective_price(), currency);

    if product.is_discounted() {
        format!(
            "{price} (was {}, -{}%)",
            format_money(product.price, currency),
            product.discount_percentage.normalize()
        )
    } else {
        price
    }
}

use std::{
    io::{self, Write},
    sync::Arc,
};

use anyhow::bail;
use clap::{Args, Subcommand};
use storefront::{
    cart::{LineItemId, VariantSelection},
    catalog::CatalogSource,
    receipt::{Receipt, TotalsView},
    store::CartStore,
};

use crate::cli::Context;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart and its totals
    Show(ShowArgs),
    /// Add a product
    Add(AddArgs),
    /// Set a line's quantity
    Update(UpdateArgs),
    /// Remove a line
    Remove(RemoveArgs),
    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Coupon code to preview
    #[arg(long)]
    coupon: Option<String>,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product id
    product_id: String,

    /// Units to add
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    quantity: i64,

    /// Size label; the first offered size when omitted
    #[arg(long)]
    size: Option<String>,

    /// Color label; the first offered color when omitted
    #[arg(long)]
    color: Option<String>,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Line id, as shown by `cart show`
    line_id: LineItemId,

    /// New quantity
    #[arg(allow_negative_numbers = true)]
    quantity: i64,
}

#[derive(Debug, Args)]
struct RemoveArgs {
    /// Line id, as shown by `cart show`
    line_id: LineItemId,
}

pub(crate) async fn run(ctx: &Context, command: CartCommand) -> anyhow::Result<()> {
    let mut store = CartStore::open(Arc::clone(&ctx.storage), ctx.rules.clone());
    let mut out = io::stdout();

    match command.command {
        CartSubcommand::Show(args) => {
            if let Some(code) = args.coupon {
                store.apply_coupon(&code)?;
            }

            write_cart(&mut out, &store)?;
        }
        CartSubcommand::Add(args) => {
            let product = ctx.catalog.get_by_id(&args.product_id).await?;
            let defaults = VariantSelection::defaults_for(&product);

            let variant = VariantSelection {
                size: args.size.or(defaults.size),
                color: args.color.or(defaults.color),
            };

            let id = store.add_item(&product, args.quantity, variant)?;

            writeln!(out, "Added {} x {} (line {id})", args.quantity, product.name)?;
        }
        CartSubcommand::Update(args) => update(&mut out, &mut store, args)?,
        CartSubcommand::Remove(args) => {
            if !store.remove_item(args.line_id) {
                bail!("no cart line {}", args.line_id);
            }

            write_cart(&mut out, &store)?;
        }
        CartSubcommand::Clear => {
            store.clear();

            writeln!(out, "Cart cleared.")?;
        }
    }

    Ok(())
}

fn update(out: &mut impl Write, store: &mut CartStore, args: UpdateArgs) -> anyhow::Result<()> {
    if !store.update_quantity(args.line_id, args.quantity) {
        writeln!(out, "Nothing changed.")?;
    }

    write_cart(out, store)
}

fn write_cart(out: &mut impl Write, store: &CartStore) -> anyhow::Result<()> {
    Receipt::new(store.cart(), store.totals(), TotalsView::Summary).write_to(&mut *out)?;

    for (idx, item) in store.cart().iter().enumerate() {
        writeln!(out, "#{:<3} {}", idx + 1, item.id)?;
    }

    writeln!(out, "{} item(s)", store.item_count())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use storefront::{fixtures::Fixture, pricing::PricingRules, storage::MemoryStore};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn non_positive_update_reports_nothing_changed() -> TestResult {
        let catalog = Fixture::seed()?.catalog();
        let bag = catalog.get("5")?;

        let mut store = CartStore::open(Arc::new(MemoryStore::new()), PricingRules::default());
        let line_id = store.add_item(bag, 2, VariantSelection::defaults_for(bag))?;

        let mut out = Vec::new();
        update(&mut out, &mut store, UpdateArgs { line_id, quantity: 0 })?;

        assert!(String::from_utf8(out)?.starts_with("Nothing changed."));
        assert_eq!(store.item_count(), 2);

        Ok(())
    }
}

//! Receipt

use std::{fmt::Write, io};

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{Cart, LineItem},
    pricing::{CartTotals, format_money},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO(#[from] io::Error),
}

/// Which total the receipt ends with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsView {
    /// Cart summary, before tax
    Summary,

    /// Checkout, including tax
    Checkout,
}

/// Printable breakdown of a cart and its totals.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    cart: &'a Cart,
    totals: CartTotals,
    view: TotalsView,
}

impl<'a> Receipt<'a> {
    /// Create a receipt for `cart` with precomputed `totals`.
    #[must_use]
    pub fn new(cart: &'a Cart, totals: CartTotals, view: TotalsView) -> Self {
        Self { cart, totals, view }
    }

    /// Totals shown on the receipt.
    #[must_use]
    pub fn totals(&self) -> &CartTotals {
        &self.totals
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if self.cart.is_empty() {
            writeln!(out, "\nYour cart is empty.\n")?;

            return Ok(());
        }

        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Variant", "Price", "Qty", "Total"]);

        for (idx, item) in self.cart.iter().enumerate() {
            builder.push_record(self.line_cells(idx, item));
        }

        write_receipt_table(&mut out, builder)?;

        self.write_summary(&mut out)
    }

    fn line_cells(&self, idx: usize, item: &LineItem) -> [String; 6] {
        let currency = self.totals.currency;

        [
            format!("#{:<3}", idx + 1),
            item.product.name.clone(),
            item.variant_label(),
            format_money(item.unit_price(), currency),
            item.quantity.to_string(),
            format_money(item.line_total(), currency),
        ]
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let totals = &self.totals;

        let mut lines: Vec<(&str, String)> = vec![(" Subtotal:", totals.display(totals.subtotal))];

        if !totals.discount.is_zero() {
            lines.push((" Discount:", format!("-{}", totals.display(totals.discount))));
        }

        let shipping = if totals.free_shipping() {
            "Free".to_string()
        } else {
            totals.display(totals.shipping)
        };

        lines.push((" Shipping:", shipping));

        let total = match self.view {
            TotalsView::Summary => totals.summary_total(),
            TotalsView::Checkout => {
                lines.push((" Tax:", totals.display(totals.tax)));
                totals.checkout_total()
            }
        };

        let label_width = lines
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or_default()
            .max(" Total:".len());

        let total_val = totals.display(total);

        let value_width = lines
            .iter()
            .map(|(_, value)| value.len())
            .max()
            .unwrap_or_default()
            .max(total_val.len());

        for (label, value) in &lines {
            write_summary_line(out, label, value, label_width, value_width)?;
        }

        write_summary_line(
            out,
            " \x1b[1mTotal:\x1b[0m",
            &format!("\x1b[1m{total_val}\x1b[0m"),
            label_width,
            value_width,
        )?;

        writeln!(out)?;

        Ok(())
    }
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}")?;

    Ok(())
}

/// Wraps runs of box-drawing characters (U+2500..U+257F) in ANSI dark grey.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a right-aligned value.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {}{value}",
        "",
        " ".repeat(value_pad)
    )?;

    Ok(())
}

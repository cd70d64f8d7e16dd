use serde::{Deserialize, Serialize};

use super::invoices::LineItemInput;

/// Derived money fields of an invoice. Always recomputed from the line items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub sub_total: f64,
    pub tax_total: f64,
    pub total: f64,
}

/// `quantity * unit_price`, before tax.
pub fn line_subtotal(item: &LineItemInput) -> f64 {
    item.quantity * item.unit_price
}

/// Tax owed on one line. A missing tax percent counts as zero.
pub fn line_tax(item: &LineItemInput) -> f64 {
    line_subtotal(item) * item.tax_percent.unwrap_or(0.0) / 100.0
}

pub fn line_total(item: &LineItemInput) -> f64 {
    line_subtotal(item) + line_tax(item)
}

/// Sums subtotal and tax over `items`. Inputs are not validated here.
pub fn compute_totals(items: &[LineItemInput]) -> InvoiceTotals {
    let (sub_total, tax_total) = items.iter().fold((0.0, 0.0), |(sub, tax), item| {
        (sub + line_subtotal(item), tax + line_tax(item))
    });

    InvoiceTotals {
        sub_total,
        tax_total,
        total: sub_total + tax_total,
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    enums::invoice_statuses::InvoiceStatus,
    totals::{line_total, InvoiceTotals},
};
use crate::domain::entities::invoices::InvoiceEntity;

pub const DEFAULT_PAYMENT_TERMS: &str = "Net 15";
pub const INVOICE_NUMBER_PREFIX: &str = "INV-";

/// Sender details, copied onto every invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillFrom {
    pub business_name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
}

/// Client details, copied onto every invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillTo {
    pub client_name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
}

/// Line item as sent by the client. Any `total` the client sends is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    #[serde(default)]
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(default)]
    pub tax_percent: Option<f64>,
}

/// Line item as stored, with its computed total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub tax_percent: f64,
    pub total: f64,
}

impl LineItem {
    pub fn priced(input: &LineItemInput) -> Self {
        Self {
            name: input.name.trim().to_string(),
            quantity: input.quantity,
            unit_price: input.unit_price,
            tax_percent: input.tax_percent.unwrap_or(0.0),
            total: line_total(input),
        }
    }
}

/// Body of create and the shared part of update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertInvoiceModel {
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub bill_from: BillFrom,
    #[serde(default)]
    pub bill_to: BillTo,
    #[serde(default)]
    pub items: Vec<LineItemInput>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
}

impl InsertInvoiceModel {
    /// Checks required fields and numeric ranges. `invoice_date` is the
    /// effective date after defaulting. Returns every problem found.
    pub fn validate(&self, invoice_date: NaiveDate) -> Result<(), String> {
        let mut problems = Vec::new();

        if self.invoice_number.trim().is_empty() {
            problems.push("Invoice number is required".to_string());
        }
        if self.bill_to.client_name.trim().is_empty() {
            problems.push("Client name is required".to_string());
        }
        if self.items.is_empty() {
            problems.push("At least one item is required".to_string());
        }

        for (index, item) in self.items.iter().enumerate() {
            let position = index + 1;
            if item.name.trim().is_empty() {
                problems.push(format!("Item {position}: name is required"));
            }
            if !item.quantity.is_finite() || item.quantity <= 0.0 {
                problems.push(format!("Item {position}: quantity must be greater than 0"));
            }
            if !item.unit_price.is_finite() || item.unit_price < 0.0 {
                problems.push(format!("Item {position}: unit price must not be negative"));
            }
            if let Some(tax_percent) = item.tax_percent {
                if !tax_percent.is_finite() || tax_percent < 0.0 {
                    problems.push(format!("Item {position}: tax percent must not be negative"));
                }
            }
        }

        if let Some(due_date) = self.due_date {
            if due_date < invoice_date {
                problems.push("Due date must be on or after invoice date".to_string());
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }

    pub fn priced_items(&self) -> Vec<LineItem> {
        self.items.iter().map(LineItem::priced).collect()
    }

    pub fn payment_terms_or_default(&self) -> String {
        self.payment_terms
            .as_deref()
            .map(str::trim)
            .filter(|terms| !terms.is_empty())
            .unwrap_or(DEFAULT_PAYMENT_TERMS)
            .to_string()
    }
}

/// Full replacement body for update. `status` is kept when omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceModel {
    #[serde(flatten)]
    pub invoice: InsertInvoiceModel,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateInvoiceStatusModel {
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListInvoicesFilter {
    pub status: Option<InvoiceStatus>,
    pub search: Option<String>,
}

/// Invoice document as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDto {
    pub id: Uuid,
    pub owner: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub bill_from: BillFrom,
    pub bill_to: BillTo,
    pub items: Vec<LineItem>,
    pub notes: Option<String>,
    pub payment_terms: String,
    pub status: InvoiceStatus,
    pub sub_total: f64,
    pub tax_total: f64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceDto {
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            sub_total: self.sub_total,
            tax_total: self.tax_total,
            total: self.total,
        }
    }
}

impl From<InvoiceEntity> for InvoiceDto {
    fn from(value: InvoiceEntity) -> Self {
        Self {
            id: value.id,
            owner: value.owner_id,
            invoice_number: value.invoice_number,
            invoice_date: value.invoice_date,
            due_date: value.due_date,
            bill_from: value.bill_from,
            bill_to: value.bill_to,
            items: value.items,
            notes: value.notes,
            payment_terms: value.payment_terms,
            status: value.status,
            sub_total: value.sub_total,
            tax_total: value.tax_total,
            total: value.total,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextInvoiceNumberDto {
    pub invoice_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteInvoiceDto {
    pub message: String,
}

/// Suggests the next `INV-nnn` number after the highest numeric suffix in
/// `existing`. Numbers that do not follow the pattern, or whose successor
/// does not fit in a `u64`, are ignored.
pub fn next_invoice_number<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let next = existing
        .into_iter()
        .filter_map(|number| number.trim().strip_prefix(INVOICE_NUMBER_PREFIX))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .filter_map(|suffix| suffix.checked_add(1))
        .max()
        .unwrap_or(1);

    format!("{}{:03}", INVOICE_NUMBER_PREFIX, next)
}

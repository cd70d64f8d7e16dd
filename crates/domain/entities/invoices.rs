use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::{
        enums::invoice_statuses::InvoiceStatus,
        invoices::{BillFrom, BillTo, LineItem},
    },
    infra::db::postgres::schema::invoices,
};

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
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

impl InvoiceEntity {
    /// Case-insensitive match on invoice number or client name.
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.invoice_number.to_lowercase().contains(needle)
            || self.bill_to.client_name.to_lowercase().contains(needle)
    }
}

/// Raw row used for Diesel queries. Embedded records stay as JSON and are
/// parsed into their typed form.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InvoiceRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub bill_from: serde_json::Value,
    pub bill_to: serde_json::Value,
    pub items: serde_json::Value,
    pub notes: Option<String>,
    pub payment_terms: String,
    pub status: String,
    pub sub_total: f64,
    pub tax_total: f64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for InvoiceEntity {
    type Error = anyhow::Error;

    fn try_from(value: InvoiceRow) -> Result<Self> {
        let bill_from = serde_json::from_value(value.bill_from)
            .with_context(|| format!("invoice {} has malformed bill_from", value.id))?;
        let bill_to = serde_json::from_value(value.bill_to)
            .with_context(|| format!("invoice {} has malformed bill_to", value.id))?;
        let items = serde_json::from_value(value.items)
            .with_context(|| format!("invoice {} has malformed items", value.id))?;
        let status = InvoiceStatus::try_from(value.status.as_str())?;

        Ok(Self {
            id: value.id,
            owner_id: value.owner_id,
            invoice_number: value.invoice_number,
            invoice_date: value.invoice_date,
            due_date: value.due_date,
            bill_from,
            bill_to,
            items,
            notes: value.notes,
            payment_terms: value.payment_terms,
            status,
            sub_total: value.sub_total,
            tax_total: value.tax_total,
            total: value.total,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invoices)]
pub struct InsertInvoiceEntity {
    pub owner_id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub bill_from: serde_json::Value,
    pub bill_to: serde_json::Value,
    pub items: serde_json::Value,
    pub notes: Option<String>,
    pub payment_terms: String,
    pub status: String,
    pub sub_total: f64,
    pub tax_total: f64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update. `None` leaves a column untouched; `Some(None)` clears a
/// nullable column.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = invoices)]
pub struct UpdateInvoiceEntity {
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<Option<NaiveDate>>,
    pub bill_from: Option<serde_json::Value>,
    pub bill_to: Option<serde_json::Value>,
    pub items: Option<serde_json::Value>,
    pub notes: Option<Option<String>>,
    pub payment_terms: Option<String>,
    pub status: Option<String>,
    pub sub_total: Option<f64>,
    pub tax_total: Option<f64>,
    pub total: Option<f64>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> InvoiceRow {
        let now = Utc::now();
        InvoiceRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            invoice_number: "INV-001".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            due_date: None,
            bill_from: json!({ "businessName": "Studio" }),
            bill_to: json!({ "clientName": "Acme", "email": "ap@acme.test" }),
            items: json!([{ "name": "Logo", "quantity": 1.0, "unitPrice": 800.0, "taxPercent": 0.0, "total": 800.0 }]),
            notes: None,
            payment_terms: "Net 15".to_string(),
            status: "Paid".to_string(),
            sub_total: 800.0,
            tax_total: 0.0,
            total: 800.0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_converts_into_typed_entity() {
        let entity = InvoiceEntity::try_from(row()).unwrap();

        assert_eq!(entity.bill_from.business_name, "Studio");
        assert_eq!(entity.bill_to.email, "ap@acme.test");
        assert_eq!(entity.items.len(), 1);
        assert_eq!(entity.status, InvoiceStatus::Paid);
    }

    #[test]
    fn unknown_status_fails_conversion() {
        let mut row = row();
        row.status = "Refunded".to_string();

        assert!(InvoiceEntity::try_from(row).is_err());
    }

    #[test]
    fn search_matches_number_or_client() {
        let entity = InvoiceEntity::try_from(row()).unwrap();

        assert!(entity.matches_search("inv-00"));
        assert!(entity.matches_search("acme"));
        assert!(!entity.matches_search("globex"));
    }
}

use anyhow::Result;
use async_trait::async_trait;
use diesel::{
    OptionalExtension, RunQueryDsl, delete, insert_into,
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
    update,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::invoices},
};
use domain::{
    entities::invoices::{InsertInvoiceEntity, InvoiceEntity, InvoiceRow, UpdateInvoiceEntity},
    repositories::invoices::{DuplicateInvoiceNumber, InvoiceRepository},
    value_objects::enums::invoice_statuses::InvoiceStatus,
};

pub struct InvoicePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl InvoicePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn write_error(err: DieselError, invoice_number: &str) -> anyhow::Error {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DuplicateInvoiceNumber(invoice_number.to_string()).into()
        }
        other => other.into(),
    }
}

#[async_trait]
impl InvoiceRepository for InvoicePostgres {
    async fn create(&self, invoice: InsertInvoiceEntity) -> Result<InvoiceEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(invoices::table)
            .values(&invoice)
            .returning(InvoiceRow::as_returning())
            .get_result::<InvoiceRow>(&mut conn)
            .map_err(|err| write_error(err, &invoice.invoice_number))?;

        InvoiceEntity::try_from(row)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = invoices::table
            .filter(invoices::owner_id.eq(owner_id))
            .into_boxed();

        if let Some(status) = status {
            query = query.filter(invoices::status.eq(status.as_str()));
        }

        let rows = query
            .order((invoices::created_at.desc(), invoices::id.desc()))
            .select(InvoiceRow::as_select())
            .load::<InvoiceRow>(&mut conn)?;

        rows.into_iter().map(InvoiceEntity::try_from).collect()
    }

    async fn find_by_id_and_owner(
        &self,
        invoice_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = invoices::table
            .filter(invoices::id.eq(invoice_id))
            .filter(invoices::owner_id.eq(owner_id))
            .select(InvoiceRow::as_select())
            .first::<InvoiceRow>(&mut conn)
            .optional()?;

        row.map(InvoiceEntity::try_from).transpose()
    }

    async fn update_by_id_and_owner(
        &self,
        invoice_id: Uuid,
        owner_id: Uuid,
        changes: UpdateInvoiceEntity,
    ) -> Result<Option<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = update(
            invoices::table
                .filter(invoices::id.eq(invoice_id))
                .filter(invoices::owner_id.eq(owner_id)),
        )
        .set(&changes)
        .returning(InvoiceRow::as_returning())
        .get_result::<InvoiceRow>(&mut conn)
        .optional()
        .map_err(|err| {
            write_error(err, changes.invoice_number.as_deref().unwrap_or_default())
        })?;

        row.map(InvoiceEntity::try_from).transpose()
    }

    async fn delete_by_id_and_owner(&self, invoice_id: Uuid, owner_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(
            invoices::table
                .filter(invoices::id.eq(invoice_id))
                .filter(invoices::owner_id.eq(owner_id)),
        )
        .execute(&mut conn)?;

        Ok(deleted > 0)
    }

    async fn invoice_number_taken(
        &self,
        owner_id: Uuid,
        invoice_number: String,
        exclude_invoice_id: Option<Uuid>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = invoices::table
            .filter(invoices::owner_id.eq(owner_id))
            .filter(invoices::invoice_number.eq(invoice_number))
            .into_boxed();

        if let Some(exclude_invoice_id) = exclude_invoice_id {
            query = query.filter(invoices::id.ne(exclude_invoice_id));
        }

        let count = query.count().get_result::<i64>(&mut conn)?;

        Ok(count > 0)
    }

    async fn list_invoice_numbers(&self, owner_id: Uuid) -> Result<Vec<String>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let numbers = invoices::table
            .filter(invoices::owner_id.eq(owner_id))
            .select(invoices::invoice_number)
            .load::<String>(&mut conn)?;

        Ok(numbers)
    }
}

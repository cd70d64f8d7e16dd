pub mod invoice_statuses;
pub mod locales;

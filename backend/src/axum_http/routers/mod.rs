pub mod ai;
pub mod invoices;

pub mod ai;
pub mod dashboard;
pub mod enums;
pub mod invoices;
pub mod totals;

use crate::domain::{
    entities::invoices::InvoiceEntity, value_objects::enums::invoice_statuses::InvoiceStatus,
};

pub const RECENT_INVOICE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct RecentInvoice {
    pub invoice_number: String,
    pub total: f64,
    pub status: InvoiceStatus,
}

/// Aggregate figures for one user's invoices, fed to the insights prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_invoices: usize,
    pub paid_invoices: usize,
    pub unpaid_invoices: usize,
    pub total_revenue: f64,
    pub total_outstanding: f64,
    pub recent: Vec<RecentInvoice>,
}

impl DashboardStats {
    pub fn from_invoices(invoices: &[InvoiceEntity]) -> Self {
        let mut paid_invoices = 0;
        let mut unpaid_invoices = 0;
        let mut total_revenue = 0.0;
        let mut total_outstanding = 0.0;

        for invoice in invoices {
            match invoice.status {
                InvoiceStatus::Paid => {
                    paid_invoices += 1;
                    total_revenue += invoice.total;
                }
                InvoiceStatus::Unpaid => {
                    unpaid_invoices += 1;
                    total_outstanding += invoice.total;
                }
            }
        }

        let mut newest_first: Vec<&InvoiceEntity> = invoices.iter().collect();
        newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let recent = newest_first
            .into_iter()
            .take(RECENT_INVOICE_LIMIT)
            .map(|invoice| RecentInvoice {
                invoice_number: invoice.invoice_number.clone(),
                total: invoice.total,
                status: invoice.status,
            })
            .collect();

        Self {
            total_invoices: invoices.len(),
            paid_invoices,
            unpaid_invoices,
            total_revenue,
            total_outstanding,
            recent,
        }
    }

    /// Compact text digest interpolated into the insights prompt.
    pub fn digest(&self) -> String {
        let recent = self
            .recent
            .iter()
            .map(|invoice| {
                format!(
                    "Invoice #{} for {:.2} with status {}",
                    invoice.invoice_number, invoice.total, invoice.status
                )
            })
            .collect::<Vec<_>>()
            .join("; ");

        format!(
            "- Total Number of Invoices: {total}\n\
             - Total Paid Invoices: {paid}\n\
             - Total Unpaid Invoices: {unpaid}\n\
             - Total Revenue from Paid Invoices: {revenue:.2}\n\
             - Total Outstanding Amount from Unpaid Invoices: {outstanding:.2}\n\
             - Recent Invoices (last {limit}): {recent}",
            total = self.total_invoices,
            paid = self.paid_invoices,
            unpaid = self.unpaid_invoices,
            revenue = self.total_revenue,
            outstanding = self.total_outstanding,
            limit = RECENT_INVOICE_LIMIT,
            recent = recent,
        )
    }
}

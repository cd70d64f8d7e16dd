use std::fmt::Display;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Payment state of an invoice. Transitions are manual in both directions.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvoiceStatus {
    #[default]
    Unpaid,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "Unpaid",
            InvoiceStatus::Paid => "Paid",
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, InvoiceStatus::Paid)
    }
}

impl Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for InvoiceStatus {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "Unpaid" => Ok(InvoiceStatus::Unpaid),
            "Paid" => Ok(InvoiceStatus::Paid),
            other => bail!("unknown invoice status: {other}"),
        }
    }
}

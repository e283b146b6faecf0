//! Invoice lifecycle state machine
//!
//! ```text
//!            pay
//!   Unpaid ───────▶ Paid        (terminal, payment_date set)
//!     │
//!     │ cancel
//!     ▼
//!   Cancelled                    (terminal)
//! ```
//!
//! A transition is a pure function from the current invoice to a new
//! invoice value; the input is never modified. Concurrent callers are
//! serialized by the repository's compare-and-set on `Invoice::version`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::error::{InvoicingError, InvoicingResult};
use crate::invoice::{Invoice, InvoiceStatus};

/// An explicit user action that moves an invoice out of `Unpaid`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    Pay,
    Cancel,
}

impl LifecycleAction {
    /// Status reached when the action succeeds
    pub fn target(&self) -> InvoiceStatus {
        match self {
            LifecycleAction::Pay => InvoiceStatus::Paid,
            LifecycleAction::Cancel => InvoiceStatus::Cancelled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Pay => "pay",
            LifecycleAction::Cancel => "cancel",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleAction {
    type Err = InvoicingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pay" => Ok(LifecycleAction::Pay),
            "cancel" => Ok(LifecycleAction::Cancel),
            other => Err(InvoicingError::validation(
                "action",
                format!("unknown action {other:?}, expected \"pay\" or \"cancel\""),
            )),
        }
    }
}

/// Actions allowed from `status`
pub fn allowed_actions(status: InvoiceStatus) -> &'static [LifecycleAction] {
    match status {
        InvoiceStatus::Unpaid => &[LifecycleAction::Pay, LifecycleAction::Cancel],
        InvoiceStatus::Paid | InvoiceStatus::Cancelled => &[],
    }
}

/// Applies `action` as of now
pub fn transition(invoice: &Invoice, action: LifecycleAction) -> InvoicingResult<Invoice> {
    transition_at(invoice, action, Utc::now())
}

/// Applies `action` as of `at`, which becomes the payment date when paying
pub fn transition_at(
    invoice: &Invoice,
    action: LifecycleAction,
    at: DateTime<Utc>,
) -> InvoicingResult<Invoice> {
    let from = invoice.status();
    if !allowed_actions(from).contains(&action) {
        return Err(InvoicingError::InvalidTransition { from, action });
    }

    let to = action.target();
    let payment_date = match action {
        LifecycleAction::Pay => Some(at),
        LifecycleAction::Cancel => None,
    };

    let mut next = invoice.clone();
    next.settle(to, payment_date, at);

    info!(
        invoice_number = next.invoice_number().unwrap_or("-"),
        %from,
        %to,
        "Invoice transitioned"
    );
    Ok(next)
}

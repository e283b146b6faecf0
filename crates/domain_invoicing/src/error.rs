//! Invoicing domain errors

use core_kernel::{LineItemId, MoneyError, PortError};
use thiserror::Error;

use crate::invoice::InvoiceStatus;
use crate::lifecycle::LifecycleAction;

/// Errors that can occur in the invoicing domain
///
/// Validation, transition and lock failures are never retryable: repeating
/// the same call against the same state fails the same way.
#[derive(Debug, Error)]
pub enum InvoicingError {
    /// Malformed or missing required input
    #[error("Validation error on {field}: {message}")]
    Validation {
        field: String,
        message: String,
    },

    /// The lifecycle does not allow this action from the current status
    #[error("Invalid transition: cannot {action} an invoice that is {from}")]
    InvalidTransition {
        from: InvoiceStatus,
        action: LifecycleAction,
    },

    /// Items can only change while the invoice is unpaid
    #[error("Invoice is locked: items cannot change once it is {status}")]
    InvoiceLocked {
        status: InvoiceStatus,
    },

    /// No item with this id on the invoice
    #[error("Line item not found: {0}")]
    ItemNotFound(LineItemId),

    /// Failure reported by an external collaborator
    #[error(transparent)]
    Port(#[from] PortError),
}

impl InvoicingError {
    /// Creates a validation error for a named field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        InvoicingError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Wraps a money error as a validation failure on `field`
    pub fn from_money(field: impl Into<String>, error: MoneyError) -> Self {
        InvoicingError::validation(field, error.to_string())
    }

    /// Returns true only for transient collaborator failures
    pub fn is_retryable(&self) -> bool {
        matches!(self, InvoicingError::Port(e) if e.is_transient())
    }
}

/// Result alias for the invoicing domain
pub type InvoicingResult<T> = Result<T, InvoicingError>;

//! CLI error handling

use serde::Serialize;
use thiserror::Error;

use core_kernel::{ClientId, CoreError, PortError};
use domain_invoicing::InvoicingError;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Rejected command line; carries clap's message with the usage line
    #[error("{0}")]
    Usage(String),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed request: {0}")]
    Request(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("Invoice is for client {invoice_client} but the request supplies client {client}")]
    ClientMismatch {
        invoice_client: ClientId,
        client: ClientId,
    },

    #[error(transparent)]
    Invoicing(#[from] InvoicingError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PortError> for CliError {
    fn from(error: PortError) -> Self {
        CliError::Invoicing(InvoicingError::Port(error))
    }
}

impl CliError {
    /// Process exit code, following the BSD `sysexits` conventions
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) => 64,
            CliError::Request(_) | CliError::ClientMismatch { .. } => 65,
            CliError::Io { .. } => 66,
            CliError::Invoicing(InvoicingError::Port(e)) if e.is_transient() => 75,
            CliError::Invoicing(InvoicingError::Port(_)) => 70,
            CliError::Invoicing(_) => 65,
            CliError::Internal(_) => 70,
            CliError::Config(_) => 78,
        }
    }

    /// Stable machine-readable category
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::Usage(_) => "usage",
            CliError::Io { .. } => "io",
            CliError::Request(_) => "bad_request",
            CliError::Config(_) => "configuration",
            CliError::ClientMismatch { .. } => "client_mismatch",
            CliError::Invoicing(InvoicingError::Validation { .. }) => "validation_error",
            CliError::Invoicing(InvoicingError::InvalidTransition { .. }) => "invalid_transition",
            CliError::Invoicing(InvoicingError::InvoiceLocked { .. }) => "invoice_locked",
            CliError::Invoicing(InvoicingError::ItemNotFound(_)) => "not_found",
            CliError::Invoicing(InvoicingError::Port(e)) if e.is_not_found() => "not_found",
            CliError::Invoicing(InvoicingError::Port(e)) if e.is_conflict() => "conflict",
            CliError::Invoicing(InvoicingError::Port(_)) => "port_error",
            CliError::Internal(_) => "internal_error",
        }
    }
}

/// Error body written to stderr
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&CliError> for ErrorReport {
    fn from(error: &CliError) -> Self {
        let field = match error {
            CliError::Invoicing(InvoicingError::Validation { field, .. }) => Some(field.clone()),
            _ => None,
        };
        Self {
            error: error.kind().to_string(),
            message: error.to_string(),
            field,
        }
    }
}

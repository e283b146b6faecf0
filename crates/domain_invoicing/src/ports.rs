//! Invoicing Domain Ports
//!
//! The invoicing core depends on three external collaborators: the client
//! directory, the issuer profile, and invoice persistence. Each is a trait
//! so the remote API adapter and the in-memory adapter are interchangeable.
//!
//! ```rust,ignore
//! let service = InvoiceService::new(
//!     Arc::new(InMemoryInvoiceRepository::new(config.numbering())),
//!     directory.clone(),
//!     directory,
//!     config.max_update_attempts,
//! );
//! ```

use async_trait::async_trait;

use core_kernel::{ClientId, DomainPort, InvoiceId, PortError};

use crate::invoice::Invoice;
use crate::party::{ClientDetails, IssuerProfile};

/// Client lookup
#[async_trait]
pub trait ClientDirectory: DomainPort {
    /// Resolves a client by id
    async fn get_client(&self, id: ClientId) -> Result<ClientDetails, PortError>;
}

/// Business profile of the account issuing invoices
#[async_trait]
pub trait IssuerProfileSource: DomainPort {
    async fn get_issuer_profile(&self) -> Result<IssuerProfile, PortError>;
}

/// Invoice persistence
#[async_trait]
pub trait InvoiceRepository: DomainPort {
    /// Stores a new invoice, assigning its id and sequential invoice number
    async fn save_invoice(&self, invoice: Invoice) -> Result<InvoiceId, PortError>;

    /// Loads an invoice by id
    async fn load_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError>;

    /// Lists all invoices in creation order
    async fn list_invoices(&self) -> Result<Vec<Invoice>, PortError>;

    /// Replaces a stored invoice if its stored version is still `expected_version`
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` when another writer got there first.
    async fn replace_invoice(&self, invoice: &Invoice, expected_version: u64) -> Result<(), PortError>;
}

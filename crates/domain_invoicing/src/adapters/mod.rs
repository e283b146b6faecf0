//! Adapters for the invoicing ports
//!
//! The remote API adapters live with the application that owns the API
//! client. This module provides the in-memory adapters used by the CLI and
//! by tests; they honor the same contracts, including the compare-and-set
//! on `InvoiceRepository::replace_invoice`.
//!
//! ```rust,ignore
//! use domain_invoicing::adapters::{InMemoryInvoiceRepository, InMemoryPartyDirectory};
//!
//! let repository = Arc::new(InMemoryInvoiceRepository::new(config.numbering()));
//! let directory = Arc::new(InMemoryPartyDirectory::new());
//! directory.register_client(client).await?;
//! ```

pub mod in_memory;

pub use in_memory::{InMemoryInvoiceRepository, InMemoryPartyDirectory};

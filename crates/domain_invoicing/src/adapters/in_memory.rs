//! In-memory adapters
//!
//! State sits behind `tokio::sync::RwLock`. The repository checks and bumps
//! versions under a single write lock, which is what makes
//! `replace_invoice` a compare-and-set.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use validator::{Validate, ValidationErrors};

use core_kernel::{ClientId, DomainPort, InvoiceId, PortError};

use crate::config::InvoiceNumbering;
use crate::invoice::Invoice;
use crate::party::{ClientDetails, IssuerProfile};
use crate::ports::{ClientDirectory, InvoiceRepository, IssuerProfileSource};

#[derive(Debug, Default)]
struct RepositoryState {
    invoices: HashMap<InvoiceId, Invoice>,
    // creation order
    order: Vec<InvoiceId>,
    last_sequence: u64,
}

/// Invoice store held in process memory
#[derive(Debug, Default)]
pub struct InMemoryInvoiceRepository {
    numbering: InvoiceNumbering,
    state: RwLock<RepositoryState>,
}

impl InMemoryInvoiceRepository {
    pub fn new(numbering: InvoiceNumbering) -> Self {
        Self {
            numbering,
            state: RwLock::new(RepositoryState::default()),
        }
    }
}

impl DomainPort for InMemoryInvoiceRepository {}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn save_invoice(&self, invoice: Invoice) -> Result<InvoiceId, PortError> {
        if invoice.id().is_some() {
            return Err(PortError::validation_field("invoice is already persisted", "id"));
        }

        let mut state = self.state.write().await;
        state.last_sequence += 1;
        let id = InvoiceId::new();
        let number = self.numbering.format(state.last_sequence);
        debug!(%id, invoice_number = %number, "Storing new invoice");

        state.invoices.insert(id, invoice.with_identity(id, number));
        state.order.push(id);
        Ok(id)
    }

    async fn load_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        self.state
            .read()
            .await
            .invoices
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Invoice", id))
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>, PortError> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.invoices.get(id).cloned())
            .collect())
    }

    async fn replace_invoice(&self, invoice: &Invoice, expected_version: u64) -> Result<(), PortError> {
        let id = invoice
            .id()
            .ok_or_else(|| PortError::validation_field("invoice has not been saved", "id"))?;

        let mut state = self.state.write().await;
        let stored = state
            .invoices
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Invoice", id))?;

        if stored.version() != expected_version {
            warn!(
                %id,
                expected_version,
                stored_version = stored.version(),
                "Invoice changed since it was read"
            );
            return Err(PortError::conflict(format!(
                "invoice {id} is at version {}, expected {expected_version}",
                stored.version()
            )));
        }

        *stored = invoice.clone();
        Ok(())
    }
}

/// Client directory and issuer profile held in process memory
#[derive(Debug, Default)]
pub struct InMemoryPartyDirectory {
    clients: RwLock<HashMap<ClientId, ClientDetails>>,
    issuer: RwLock<Option<IssuerProfile>>,
}

impl InMemoryPartyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a client, replacing any previous record with the same id
    pub async fn register_client(&self, client: ClientDetails) -> Result<(), PortError> {
        client.validate().map_err(validation_failure)?;
        self.clients.write().await.insert(client.id, client);
        Ok(())
    }

    /// Validates and stores the issuer profile
    pub async fn set_issuer_profile(&self, profile: IssuerProfile) -> Result<(), PortError> {
        profile.validate().map_err(validation_failure)?;
        *self.issuer.write().await = Some(profile);
        Ok(())
    }
}

fn validation_failure(errors: ValidationErrors) -> PortError {
    let field = errors
        .field_errors()
        .keys()
        .min()
        .map(|f| f.to_string())
        .unwrap_or_default();
    PortError::validation_field(errors.to_string(), field)
}

impl DomainPort for InMemoryPartyDirectory {}

#[async_trait]
impl ClientDirectory for InMemoryPartyDirectory {
    async fn get_client(&self, id: ClientId) -> Result<ClientDetails, PortError> {
        self.clients
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Client", id))
    }
}

#[async_trait]
impl IssuerProfileSource for InMemoryPartyDirectory {
    async fn get_issuer_profile(&self) -> Result<IssuerProfile, PortError> {
        self.issuer
            .read()
            .await
            .clone()
            .ok_or_else(|| PortError::not_found("IssuerProfile", "current"))
    }
}

//! Invoice application service
//!
//! Orchestrates the pure domain operations against the ports. Every write
//! follows the same shape:
//!
//! 1. load the current invoice
//! 2. run the domain operation on it (pure, may reject)
//! 3. `replace_invoice(next, current.version())`
//!
//! When step 3 loses a compare-and-set the whole sequence is re-run against
//! the fresh state. The loser of a pay/cancel race therefore sees a terminal
//! status and fails with `InvalidTransition`, and an item edit racing a
//! payment fails with `InvoiceLocked`; nothing is applied twice.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use core_kernel::{ClientId, InvoiceId, LineItemId};

use crate::document::{project_for_rendering, RenderModel};
use crate::error::{InvoicingError, InvoicingResult};
use crate::insights::{DashboardInsights, InvoiceSummary};
use crate::invoice::{Invoice, InvoiceDraft};
use crate::lifecycle::{self, LifecycleAction};
use crate::line_item::LineItemInput;
use crate::ports::{ClientDirectory, InvoiceRepository, IssuerProfileSource};

/// Use cases over invoices
pub struct InvoiceService {
    invoices: Arc<dyn InvoiceRepository>,
    clients: Arc<dyn ClientDirectory>,
    issuer: Arc<dyn IssuerProfileSource>,
    max_update_attempts: u32,
}

impl InvoiceService {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        clients: Arc<dyn ClientDirectory>,
        issuer: Arc<dyn IssuerProfileSource>,
        max_update_attempts: u32,
    ) -> Self {
        Self {
            invoices,
            clients,
            issuer,
            max_update_attempts: max_update_attempts.max(1),
        }
    }

    /// Validates a draft against the client directory and persists it
    #[instrument(skip(self, draft), fields(client_id = %draft.client_id))]
    pub async fn create_invoice(&self, draft: InvoiceDraft) -> InvoicingResult<Invoice> {
        self.clients.get_client(draft.client_id).await?;
        let invoice = Invoice::create(draft)?;

        let id = self.invoices.save_invoice(invoice).await?;
        let stored = self.invoices.load_invoice(id).await?;
        info!(
            %id,
            invoice_number = stored.invoice_number().unwrap_or("-"),
            total = %stored.totals().total_amount,
            "Invoice created"
        );
        Ok(stored)
    }

    pub async fn get_invoice(&self, id: InvoiceId) -> InvoicingResult<Invoice> {
        Ok(self.invoices.load_invoice(id).await?)
    }

    #[instrument(skip(self, input), fields(invoice_id = %id))]
    pub async fn add_item(&self, id: InvoiceId, input: LineItemInput) -> InvoicingResult<Invoice> {
        self.update(id, |current| {
            let mut next = current.clone();
            next.add_item(&input)?;
            Ok(next)
        })
        .await
    }

    #[instrument(skip(self, input), fields(invoice_id = %id, item_id = %item_id))]
    pub async fn edit_item(
        &self,
        id: InvoiceId,
        item_id: LineItemId,
        input: LineItemInput,
    ) -> InvoicingResult<Invoice> {
        self.update(id, |current| {
            let mut next = current.clone();
            next.edit_item(item_id, &input)?;
            Ok(next)
        })
        .await
    }

    #[instrument(skip(self), fields(invoice_id = %id, item_id = %item_id))]
    pub async fn remove_item(&self, id: InvoiceId, item_id: LineItemId) -> InvoicingResult<Invoice> {
        self.update(id, |current| {
            let mut next = current.clone();
            next.remove_item(item_id)?;
            Ok(next)
        })
        .await
    }

    /// Applies a lifecycle action ("mark as paid" / "cancel")
    #[instrument(skip(self), fields(invoice_id = %id, action = %action))]
    pub async fn transition(&self, id: InvoiceId, action: LifecycleAction) -> InvoicingResult<Invoice> {
        self.update(id, |current| lifecycle::transition(current, action)).await
    }

    /// Resolves the client and issuer and projects the invoice for rendering
    #[instrument(skip(self), fields(invoice_id = %id))]
    pub async fn render(&self, id: InvoiceId) -> InvoicingResult<RenderModel> {
        let invoice = self.invoices.load_invoice(id).await?;
        let client = self.clients.get_client(invoice.client_id()).await?;
        let issuer = self.issuer.get_issuer_profile().await?;
        Ok(project_for_rendering(&invoice, &client, &issuer))
    }

    /// Invoice list rows; unresolvable clients are shown as "Unknown"
    pub async fn list_summaries(&self) -> InvoicingResult<Vec<InvoiceSummary>> {
        let invoices = self.invoices.list_invoices().await?;
        let mut names: HashMap<ClientId, Option<String>> = HashMap::new();
        let mut summaries = Vec::with_capacity(invoices.len());

        for invoice in &invoices {
            let client_id = invoice.client_id();
            if !names.contains_key(&client_id) {
                let name = match self.clients.get_client(client_id).await {
                    Ok(client) => Some(client.display_name().to_string()),
                    Err(e) if e.is_not_found() => None,
                    Err(e) => return Err(e.into()),
                };
                names.insert(client_id, name);
            }
            let name = names.get(&client_id).and_then(|n| n.as_deref());
            summaries.push(InvoiceSummary::from_invoice(invoice, name));
        }
        Ok(summaries)
    }

    pub async fn dashboard(&self, today: NaiveDate) -> InvoicingResult<DashboardInsights> {
        let invoices = self.invoices.list_invoices().await?;
        Ok(DashboardInsights::from_invoices(&invoices, today))
    }

    async fn update<F>(&self, id: InvoiceId, operation: F) -> InvoicingResult<Invoice>
    where
        F: Fn(&Invoice) -> InvoicingResult<Invoice> + Send + Sync,
    {
        let mut attempt = 1;
        loop {
            let current = self.invoices.load_invoice(id).await?;
            let next = operation(&current)?;

            match self.invoices.replace_invoice(&next, current.version()).await {
                Ok(()) => return Ok(next),
                Err(e) if e.is_conflict() && attempt < self.max_update_attempts => {
                    warn!(%id, attempt, "Concurrent update detected, re-evaluating");
                    attempt += 1;
                }
                Err(e) => return Err(InvoicingError::from(e)),
            }
        }
    }
}

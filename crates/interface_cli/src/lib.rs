//! Invoice rendering front end
//!
//! Takes a render request (issuer, client, invoice draft and optional
//! lifecycle actions), runs it through `InvoiceService` over the in-memory
//! adapters and returns the render model for an external document renderer.

pub mod args;
pub mod error;
pub mod request;

pub use args::{Args, Invocation};
pub use error::{CliError, ErrorReport};
pub use request::RenderRequest;

use std::sync::Arc;
use tracing::{info, instrument};

use domain_invoicing::{
    InMemoryInvoiceRepository, InMemoryPartyDirectory, InvoiceService, InvoicingConfig, RenderModel,
};

/// Creates the invoice, applies the requested actions and projects it
#[instrument(skip_all, fields(actions = request.actions.len()))]
pub async fn run(request: RenderRequest, config: &InvoicingConfig) -> Result<RenderModel, CliError> {
    if request.invoice.client_id != request.client.id {
        return Err(CliError::ClientMismatch {
            invoice_client: request.invoice.client_id,
            client: request.client.id,
        });
    }

    let directory = Arc::new(InMemoryPartyDirectory::new());
    directory.register_client(request.client).await?;
    directory.set_issuer_profile(request.issuer).await?;

    let service = InvoiceService::new(
        Arc::new(InMemoryInvoiceRepository::new(config.numbering())),
        directory.clone(),
        directory,
        config.max_update_attempts,
    );

    let invoice = service.create_invoice(request.invoice).await?;
    let id = invoice
        .id()
        .ok_or_else(|| CliError::Internal("repository did not assign an invoice id".to_string()))?;

    for action in request.actions {
        service.transition(id, action).await?;
    }

    let model = service.render(id).await?;
    info!(
        invoice_number = model.invoice_number.as_deref().unwrap_or("-"),
        status = %model.status,
        total = %model.totals.total_amount_display,
        "Render model ready"
    );
    Ok(model)
}

//! Invoicing Domain - Invoice Computation and Lifecycle
//!
//! This crate turns line items into invoice money, guards the invoice
//! lifecycle, and prepares the read-only model a document renderer draws.
//!
//! # Money Flow
//!
//! Every amount is derived from item source fields, never stored as truth:
//!
//! - **Line item**: `gross = quantity × rate`, `net = gross × (1 − discount%)`
//! - **Invoice**: subtotal and discount are summed over items, tax is charged
//!   on the discounted price, total is discounted price plus tax
//! - **Display**: amounts stay unrounded until formatted (half-up, 2 places)
//!
//! # Lifecycle
//!
//! - **Unpaid**: the only editable state
//! - **Paid**: terminal, records the payment date
//! - **Cancelled**: terminal
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_invoicing::{InvoiceService, LifecycleAction};
//!
//! let invoice = service.create_invoice(draft).await?;
//! let id = invoice.id().expect("assigned by the repository");
//!
//! service.transition(id, LifecycleAction::Pay).await?;
//! let model = service.render(id).await?;
//! assert_eq!(model.watermark.unwrap().text, "PAID");
//! ```

pub mod line_item;
pub mod totals;
pub mod invoice;
pub mod lifecycle;
pub mod document;
pub mod party;
pub mod insights;
pub mod ports;
pub mod adapters;
pub mod service;
pub mod config;
pub mod error;

pub use line_item::{
    calculate_line_item, line_amounts, ItemType, LineAmounts, LineItem, LineItemInput, Unit,
    MAX_QUANTITY, MAX_RATE,
};
pub use totals::{aggregate_totals, InvoiceTotals};
pub use invoice::{Invoice, InvoiceDraft, InvoiceStatus};
pub use lifecycle::{allowed_actions, transition, transition_at, LifecycleAction};
pub use document::{
    project_for_rendering, RenderModel, RenderedLineItem, RenderedTotals, Watermark,
    WatermarkColor, WatermarkPlacement,
};
pub use party::{ClientDetails, IssuerProfile};
pub use insights::{
    outstanding_total, top_client_by_loyalty, top_client_by_revenue, ClientLoyalty,
    ClientRevenue, DashboardInsights, InvoiceSummary, UNKNOWN_CLIENT,
};
pub use ports::{ClientDirectory, InvoiceRepository, IssuerProfileSource};
pub use adapters::{InMemoryInvoiceRepository, InMemoryPartyDirectory};
pub use service::InvoiceService;
pub use self::config::{InvoiceNumbering, InvoicingConfig};
pub use error::{InvoicingError, InvoicingResult};

//! Dashboard listing and client insights
//!
//! Read-only views over a set of invoices. Every amount is taken from the
//! invoice totals; nothing here recomputes invoice money.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use core_kernel::{ClientId, InvoiceId, Money};

use crate::invoice::{Invoice, InvoiceStatus};

/// Name shown when a client record cannot be resolved
pub const UNKNOWN_CLIENT: &str = "Unknown";

/// One row of the invoice list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceSummary {
    pub invoice_id: Option<InvoiceId>,
    pub invoice_number: Option<String>,
    pub client_id: ClientId,
    pub client_name: String,
    pub total_amount: Money,
    pub total_display: String,
    pub status: InvoiceStatus,
    pub can_mark_paid: bool,
}

impl InvoiceSummary {
    pub fn from_invoice(invoice: &Invoice, client_name: Option<&str>) -> Self {
        let total_amount = invoice.totals().total_amount;
        Self {
            invoice_id: invoice.id(),
            invoice_number: invoice.invoice_number().map(str::to_string),
            client_id: invoice.client_id(),
            client_name: client_name.unwrap_or(UNKNOWN_CLIENT).to_string(),
            total_amount,
            total_display: total_amount.to_display_string(invoice.currency()),
            status: invoice.status(),
            can_mark_paid: invoice.status() == InvoiceStatus::Unpaid,
        }
    }
}

/// Revenue collected from one client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClientRevenue {
    pub client_id: ClientId,
    pub total_revenue: Money,
    pub invoice_count: usize,
}

/// Number of live invoices issued to one client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClientLoyalty {
    pub client_id: ClientId,
    pub invoice_count: usize,
}

/// Client with the largest sum of paid totals
///
/// Ties go to the lower client id.
pub fn top_client_by_revenue(invoices: &[Invoice]) -> Option<ClientRevenue> {
    let mut by_client: BTreeMap<ClientId, ClientRevenue> = BTreeMap::new();
    for invoice in invoices.iter().filter(|i| i.status() == InvoiceStatus::Paid) {
        let entry = by_client.entry(invoice.client_id()).or_insert(ClientRevenue {
            client_id: invoice.client_id(),
            total_revenue: Money::zero(),
            invoice_count: 0,
        });
        entry.total_revenue += invoice.totals().total_amount;
        entry.invoice_count += 1;
    }

    by_client.into_values().fold(None, |best, candidate| match best {
        Some(b) if b.total_revenue >= candidate.total_revenue => Some(b),
        _ => Some(candidate),
    })
}

/// Client with the most invoices that were not cancelled
///
/// Ties go to the lower client id.
pub fn top_client_by_loyalty(invoices: &[Invoice]) -> Option<ClientLoyalty> {
    let mut counts: BTreeMap<ClientId, usize> = BTreeMap::new();
    for invoice in invoices.iter().filter(|i| i.status() != InvoiceStatus::Cancelled) {
        *counts.entry(invoice.client_id()).or_default() += 1;
    }

    counts
        .into_iter()
        .fold(None, |best: Option<ClientLoyalty>, (client_id, invoice_count)| match best {
            Some(b) if b.invoice_count >= invoice_count => Some(b),
            _ => Some(ClientLoyalty { client_id, invoice_count }),
        })
}

/// Sum of totals still awaiting payment
pub fn outstanding_total(invoices: &[Invoice]) -> Money {
    invoices
        .iter()
        .filter(|i| i.status() == InvoiceStatus::Unpaid)
        .map(|i| i.totals().total_amount)
        .sum()
}

/// Dashboard cards computed from the full invoice list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardInsights {
    pub top_revenue: Option<ClientRevenue>,
    pub top_loyalty: Option<ClientLoyalty>,
    pub outstanding: Money,
    pub overdue_count: usize,
}

impl DashboardInsights {
    pub fn from_invoices(invoices: &[Invoice], today: NaiveDate) -> Self {
        Self {
            top_revenue: top_client_by_revenue(invoices),
            top_loyalty: top_client_by_loyalty(invoices),
            outstanding: outstanding_total(invoices),
            overdue_count: invoices.iter().filter(|i| i.is_overdue(today)).count(),
        }
    }
}

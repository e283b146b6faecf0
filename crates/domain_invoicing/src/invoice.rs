//! Invoice aggregate
//!
//! The invoice owns its line items (insertion order is the display order)
//! and refers to its client by id only. Totals are derived from the items
//! and are recomputed inside every successful item mutation, so a reader can
//! never observe items and totals that disagree.
//!
//! # Invariants
//!
//! - `due_date >= issue_date`
//! - At least one line item
//! - Items change only while the invoice is `Unpaid`
//! - `payment_date` is set if and only if the invoice is `Paid`

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use core_kernel::{ClientId, CurrencyCode, InvoiceId, LineItemId, Percentage};

use crate::error::{InvoicingError, InvoicingResult};
use crate::line_item::{LineItem, LineItemInput};
use crate::totals::{compute_totals, InvoiceTotals};

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    /// Issued and awaiting payment; the only editable state
    Unpaid,
    /// Terminal
    Paid,
    /// Terminal
    Cancelled,
}

impl InvoiceStatus {
    /// True for the terminal states
    pub fn is_locked(&self) -> bool {
        !matches!(self, InvoiceStatus::Unpaid)
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "Unpaid",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Input for creating an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub client_id: ClientId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub currency: String,
    pub tax_rate_percent: Decimal,
    pub payment_method: String,
    pub payment_details: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<LineItemInput>,
}

/// An invoice for a freelancer's client
///
/// Deserialization goes through [`InvoiceRecord`] and rejects records that
/// break the invariants above or carry totals that disagree with the items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InvoiceRecord")]
pub struct Invoice {
    id: Option<InvoiceId>,
    invoice_number: Option<String>,
    client_id: ClientId,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    currency: CurrencyCode,
    tax_rate_percent: Percentage,
    payment_method: String,
    payment_details: String,
    payment_date: Option<DateTime<Utc>>,
    status: InvoiceStatus,
    items: Vec<LineItem>,
    totals: InvoiceTotals,
    notes: Option<String>,
    /// Bumped on every mutation; the compare-and-set token for persistence
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Validates a draft and creates an unpaid invoice
    ///
    /// The invoice has no id or number until the repository assigns them.
    pub fn create(draft: InvoiceDraft) -> InvoicingResult<Self> {
        if draft.due_date < draft.issue_date {
            return Err(InvoicingError::validation(
                "due_date",
                "due date must not be before the issue date",
            ));
        }

        let currency = CurrencyCode::parse(&draft.currency)
            .map_err(|e| InvoicingError::from_money("currency", e))?;
        let tax_rate_percent = Percentage::new(draft.tax_rate_percent)
            .map_err(|e| InvoicingError::from_money("tax_rate_percent", e))?;

        let payment_method = required_text("payment_method", &draft.payment_method)?;
        let payment_details = required_text("payment_details", &draft.payment_details)?;

        if draft.items.is_empty() {
            return Err(InvoicingError::validation(
                "items",
                "an invoice needs at least one line item",
            ));
        }
        let items = draft
            .items
            .iter()
            .map(|input| LineItem::with_id(LineItemId::new(), input))
            .collect::<InvoicingResult<Vec<_>>>()?;

        let totals = compute_totals(&items, tax_rate_percent);
        let notes = draft
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let now = Utc::now();

        Ok(Self {
            id: None,
            invoice_number: None,
            client_id: draft.client_id,
            issue_date: draft.issue_date,
            due_date: draft.due_date,
            currency,
            tax_rate_percent,
            payment_method,
            payment_details,
            payment_date: None,
            status: InvoiceStatus::Unpaid,
            items,
            totals,
            notes,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Attaches the identity assigned by the persistence collaborator
    pub fn with_identity(mut self, id: InvoiceId, invoice_number: impl Into<String>) -> Self {
        self.id = Some(id);
        self.invoice_number = Some(invoice_number.into());
        self
    }

    pub fn id(&self) -> Option<InvoiceId> {
        self.id
    }

    pub fn invoice_number(&self) -> Option<&str> {
        self.invoice_number.as_deref()
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn tax_rate_percent(&self) -> Percentage {
        self.tax_rate_percent
    }

    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    pub fn payment_details(&self) -> &str {
        &self.payment_details
    }

    pub fn payment_date(&self) -> Option<DateTime<Utc>> {
        self.payment_date
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Totals as of the last item mutation
    pub fn totals(&self) -> &InvoiceTotals {
        &self.totals
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when the invoice is still unpaid after its due date
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Unpaid && today > self.due_date
    }

    /// Appends an item and returns its id
    pub fn add_item(&mut self, input: &LineItemInput) -> InvoicingResult<LineItemId> {
        self.ensure_editable()?;
        let item = LineItem::with_id(LineItemId::new(), input)?;
        let id = item.id();

        self.items.push(item);
        self.recalculate();
        Ok(id)
    }

    /// Replaces an item in place, keeping its id and position
    pub fn edit_item(&mut self, id: LineItemId, input: &LineItemInput) -> InvoicingResult<()> {
        self.ensure_editable()?;
        let position = self.position_of(id)?;
        let item = LineItem::with_id(id, input)?;

        self.items[position] = item;
        self.recalculate();
        Ok(())
    }

    /// Removes an item; the last remaining item cannot be removed
    pub fn remove_item(&mut self, id: LineItemId) -> InvoicingResult<LineItem> {
        self.ensure_editable()?;
        let position = self.position_of(id)?;
        if self.items.len() == 1 {
            return Err(InvoicingError::validation(
                "items",
                "an invoice needs at least one line item",
            ));
        }

        let removed = self.items.remove(position);
        self.recalculate();
        Ok(removed)
    }

    /// Moves to a terminal status; only the lifecycle module calls this
    pub(crate) fn settle(&mut self, status: InvoiceStatus, payment_date: Option<DateTime<Utc>>, at: DateTime<Utc>) {
        self.status = status;
        self.payment_date = payment_date;
        self.version += 1;
        self.updated_at = at;
    }

    fn ensure_editable(&self) -> InvoicingResult<()> {
        if self.status.is_locked() {
            return Err(InvoicingError::InvoiceLocked { status: self.status });
        }
        Ok(())
    }

    fn position_of(&self, id: LineItemId) -> InvoicingResult<usize> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(InvoicingError::ItemNotFound(id))
    }

    fn recalculate(&mut self) {
        self.totals = compute_totals(&self.items, self.tax_rate_percent);
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

/// Stored shape of an invoice, checked before it becomes an [`Invoice`]
#[derive(Debug, Deserialize)]
pub struct InvoiceRecord {
    id: Option<InvoiceId>,
    invoice_number: Option<String>,
    client_id: ClientId,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    currency: CurrencyCode,
    tax_rate_percent: Percentage,
    payment_method: String,
    payment_details: String,
    payment_date: Option<DateTime<Utc>>,
    status: InvoiceStatus,
    items: Vec<LineItem>,
    totals: InvoiceTotals,
    notes: Option<String>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRecord> for Invoice {
    type Error = InvoicingError;

    fn try_from(record: InvoiceRecord) -> Result<Self, Self::Error> {
        if record.due_date < record.issue_date {
            return Err(InvoicingError::validation(
                "due_date",
                "due date must not be before the issue date",
            ));
        }
        let payment_method = required_text("payment_method", &record.payment_method)?;
        let payment_details = required_text("payment_details", &record.payment_details)?;

        if record.items.is_empty() {
            return Err(InvoicingError::validation(
                "items",
                "an invoice needs at least one line item",
            ));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = record.items.iter().find(|item| !seen.insert(item.id())) {
            return Err(InvoicingError::validation(
                "items",
                format!("line item {} appears more than once", duplicate.id()),
            ));
        }

        let paid = record.status == InvoiceStatus::Paid;
        if paid != record.payment_date.is_some() {
            return Err(InvoicingError::validation(
                "payment_date",
                format!("a {} invoice {} a payment date", record.status, if paid { "needs" } else { "cannot have" }),
            ));
        }

        let totals = compute_totals(&record.items, record.tax_rate_percent);
        if totals != record.totals {
            return Err(InvoicingError::validation(
                "totals",
                "stored totals do not match the line items",
            ));
        }

        Ok(Self {
            id: record.id,
            invoice_number: record.invoice_number,
            client_id: record.client_id,
            issue_date: record.issue_date,
            due_date: record.due_date,
            currency: record.currency,
            tax_rate_percent: record.tax_rate_percent,
            payment_method,
            payment_details,
            payment_date: record.payment_date,
            status: record.status,
            items: record.items,
            totals,
            notes: record.notes,
            version: record.version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

fn required_text(field: &str, value: &str) -> InvoicingResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InvoicingError::validation(field, format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::ClientId;
use domain_invoicing::{Invoice, InvoiceDraft, ItemType, LineItemInput};

use crate::fixtures::{DateFixtures, LineItemFixtures};

/// Builder for line item inputs
pub struct LineItemInputBuilder {
    input: LineItemInput,
}

impl Default for LineItemInputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineItemInputBuilder {
    /// One undiscounted item at 10
    pub fn new() -> Self {
        Self {
            input: LineItemFixtures::product("Widget", dec!(1), dec!(10)),
        }
    }

    pub fn with_type(mut self, item_type: Option<ItemType>) -> Self {
        self.input.item_type = item_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.input.description = description.into();
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.input.quantity = quantity;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.input.unit = unit.into();
        self
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.input.rate = rate;
        self
    }

    pub fn with_discount(mut self, discount_percent: Decimal) -> Self {
        self.input.discount_percent = discount_percent;
        self
    }

    pub fn build(self) -> LineItemInput {
        self.input
    }
}

/// Builder for invoice drafts
///
/// Defaults to the design/review worked example: subtotal 250, discount 20,
/// tax 20% for a total of 276 USD.
pub struct InvoiceDraftBuilder {
    draft: InvoiceDraft,
}

impl InvoiceDraftBuilder {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            draft: InvoiceDraft {
                client_id,
                issue_date: DateFixtures::issue_date(),
                due_date: DateFixtures::due_date(),
                currency: "USD".to_string(),
                tax_rate_percent: dec!(20),
                payment_method: "Bank transfer".to_string(),
                payment_details: "IBAN DE00 1234 5678".to_string(),
                notes: None,
                items: vec![LineItemFixtures::design_hours(), LineItemFixtures::review_hour()],
            },
        }
    }

    pub fn with_dates(mut self, issue_date: NaiveDate, due_date: NaiveDate) -> Self {
        self.draft.issue_date = issue_date;
        self.draft.due_date = due_date;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.draft.currency = currency.into();
        self
    }

    pub fn with_tax_rate(mut self, tax_rate_percent: Decimal) -> Self {
        self.draft.tax_rate_percent = tax_rate_percent;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.draft.notes = Some(notes.into());
        self
    }

    /// Replaces the default items
    pub fn with_items(mut self, items: Vec<LineItemInput>) -> Self {
        self.draft.items = items;
        self
    }

    pub fn add_item(mut self, item: LineItemInput) -> Self {
        self.draft.items.push(item);
        self
    }

    pub fn build(self) -> InvoiceDraft {
        self.draft
    }

    /// Builds and validates an unsaved invoice
    pub fn create(self) -> Invoice {
        Invoice::create(self.draft).unwrap()
    }
}

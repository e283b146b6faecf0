//! Document projection
//!
//! Builds the immutable rendering model consumed by the external PDF
//! renderer. Every derived value is resolved here: item amounts are
//! recomputed from source fields (never read from the cached values),
//! totals come from the same aggregation used everywhere else, and the
//! status watermark is decided. The renderer only decides how to draw.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{debug, warn};

use core_kernel::{CurrencyCode, Money, Percentage};

use crate::invoice::{Invoice, InvoiceStatus};
use crate::line_item::ItemType;
use crate::party::{ClientDetails, IssuerProfile};
use crate::totals::{compute_totals, InvoiceTotals};

const WATERMARK_ANGLE_DEGREES: u16 = 45;
const WATERMARK_OPACITY: Decimal = dec!(0.15);
const PAID_FONT_SIZE: u16 = 100;
// Smaller so the longer word fits on one diagonal
const CANCELLED_FONT_SIZE: u16 = 70;

/// Watermark color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkColor {
    Green,
    Red,
}

impl WatermarkColor {
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            WatermarkColor::Green => (0, 128, 0),
            WatermarkColor::Red => (255, 0, 0),
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            WatermarkColor::Green => "#008000",
            WatermarkColor::Red => "#FF0000",
        }
    }
}

/// Where the watermark is anchored on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatermarkPlacement {
    PageCenter,
}

/// Status marker overlaid on the rendered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Watermark {
    pub text: &'static str,
    pub color: WatermarkColor,
    pub color_hex: &'static str,
    pub font_size: u16,
    pub angle_degrees: u16,
    pub opacity: Decimal,
    pub placement: WatermarkPlacement,
}

impl Watermark {
    /// Decides the watermark purely from status; unpaid invoices get none
    pub fn for_status(status: InvoiceStatus) -> Option<Watermark> {
        let (text, color, font_size) = match status {
            InvoiceStatus::Unpaid => return None,
            InvoiceStatus::Paid => ("PAID", WatermarkColor::Green, PAID_FONT_SIZE),
            InvoiceStatus::Cancelled => ("CANCELLED", WatermarkColor::Red, CANCELLED_FONT_SIZE),
        };

        Some(Watermark {
            text,
            color,
            color_hex: color.hex(),
            font_size,
            angle_degrees: WATERMARK_ANGLE_DEGREES,
            opacity: WATERMARK_OPACITY,
            placement: WatermarkPlacement::PageCenter,
        })
    }
}

/// One table row of the rendered document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedLineItem {
    /// 1-based row number
    pub position: usize,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub rate: Money,
    pub discount_percent: Percentage,
    pub gross_amount: Money,
    pub net_amount: Money,
    pub rate_display: String,
    pub gross_display: String,
    pub net_display: String,
}

/// Totals block with display strings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedTotals {
    #[serde(flatten)]
    pub amounts: InvoiceTotals,
    pub tax_rate_percent: Percentage,
    pub subtotal_display: String,
    pub total_discount_display: String,
    pub tax_amount_display: String,
    pub total_amount_display: String,
}

/// Fully resolved, read-only input for the document renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub invoice_number: Option<String>,
    pub status: InvoiceStatus,
    pub status_label: &'static str,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_date: Option<DateTime<Utc>>,
    pub currency: CurrencyCode,
    pub issuer: IssuerProfile,
    pub client: ClientDetails,
    pub payment_method: String,
    pub payment_details: String,
    pub notes: Option<String>,
    pub items: Vec<RenderedLineItem>,
    pub totals: RenderedTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<Watermark>,
}

/// Projects an invoice and its already-resolved parties into a render model
///
/// Pure and infallible for any invoice built through `Invoice::create`.
pub fn project_for_rendering(
    invoice: &Invoice,
    client: &ClientDetails,
    issuer: &IssuerProfile,
) -> RenderModel {
    if client.id != invoice.client_id() {
        warn!(
            invoice_client = %invoice.client_id(),
            supplied_client = %client.id,
            "Rendering invoice with a client record that does not match its client id"
        );
    }

    let currency = invoice.currency();
    let items = invoice
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let amounts = item.amounts();
            RenderedLineItem {
                position: index + 1,
                item_type: item.item_type(),
                description: item.description().to_string(),
                quantity: item.quantity(),
                unit: item.unit().label().to_string(),
                rate: item.rate(),
                discount_percent: item.discount_percent(),
                gross_amount: amounts.gross,
                net_amount: amounts.net,
                rate_display: item.rate().to_display_string(currency),
                gross_display: amounts.gross.to_display_string(currency),
                net_display: amounts.net.to_display_string(currency),
            }
        })
        .collect();

    let amounts = compute_totals(invoice.items(), invoice.tax_rate_percent());
    let totals = RenderedTotals {
        amounts,
        tax_rate_percent: invoice.tax_rate_percent(),
        subtotal_display: amounts.subtotal.to_display_string(currency),
        total_discount_display: amounts.total_discount.to_display_string(currency),
        tax_amount_display: amounts.tax_amount.to_display_string(currency),
        total_amount_display: amounts.total_amount.to_display_string(currency),
    };

    let watermark = Watermark::for_status(invoice.status());
    debug!(
        status = %invoice.status(),
        watermark = watermark.as_ref().map(|w| w.text).unwrap_or("none"),
        "Projected invoice for rendering"
    );

    RenderModel {
        invoice_number: invoice.invoice_number().map(str::to_string),
        status: invoice.status(),
        status_label: invoice.status().label(),
        issue_date: invoice.issue_date(),
        due_date: invoice.due_date(),
        payment_date: invoice.payment_date(),
        currency: currency.clone(),
        issuer: issuer.clone(),
        client: client.clone(),
        payment_method: invoice.payment_method().to_string(),
        payment_details: invoice.payment_details().to_string(),
        notes: invoice.notes().map(str::to_string),
        items,
        totals,
        watermark,
    }
}

//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_invoicing::{Invoice, InvoiceStatus, InvoicingError, RenderModel};

/// Asserts that two Money values are within `tolerance` of each other
pub fn assert_money_approx_eq(actual: Money, expected: Money, tolerance: Decimal) {
    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts the invoice's stored totals agree with its items
pub fn assert_totals_consistent(invoice: &Invoice) {
    let totals = invoice.totals();
    let gross: Money = invoice.items().iter().map(|i| i.amounts().gross).sum();
    let net: Money = invoice.items().iter().map(|i| i.amounts().net).sum();

    assert_eq!(totals.subtotal, gross, "subtotal must be the sum of gross amounts");
    assert_eq!(totals.total_discount, gross - net, "discount must be gross minus net");
    assert_eq!(
        totals.discounted_price,
        totals.subtotal - totals.total_discount,
        "discounted price mismatch"
    );
    assert_eq!(
        totals.tax_amount,
        totals.discounted_price.percent_of(invoice.tax_rate_percent()),
        "tax must be charged on the discounted price"
    );
    assert_eq!(
        totals.total_amount,
        totals.discounted_price + totals.tax_amount,
        "total must be discounted price plus tax"
    );
    for item in invoice.items() {
        assert!(
            item.net_amount() <= item.gross_amount(),
            "net {} exceeds gross {} on {}",
            item.net_amount(),
            item.gross_amount(),
            item.description()
        );
    }
}

/// Asserts the status / payment date pairing
pub fn assert_status(invoice: &Invoice, expected: InvoiceStatus) {
    assert_eq!(invoice.status(), expected, "unexpected status");
    assert_eq!(
        invoice.payment_date().is_some(),
        expected == InvoiceStatus::Paid,
        "payment date must be set exactly when paid"
    );
}

/// Asserts a render model agrees with the invoice it was projected from
pub fn assert_render_matches(model: &RenderModel, invoice: &Invoice) {
    assert_eq!(&model.totals.amounts, invoice.totals(), "rendered totals differ");
    assert_eq!(model.items.len(), invoice.items().len(), "rendered item count differs");
    assert_eq!(model.status, invoice.status());
    match invoice.status() {
        InvoiceStatus::Unpaid => assert!(model.watermark.is_none(), "unpaid invoices have no watermark"),
        InvoiceStatus::Paid => assert_eq!(model.watermark.as_ref().map(|w| w.text), Some("PAID")),
        InvoiceStatus::Cancelled => {
            assert_eq!(model.watermark.as_ref().map(|w| w.text), Some("CANCELLED"))
        }
    }
}

/// Asserts an error is a validation failure on `field`
pub fn assert_validation_error(error: &InvoicingError, field: &str) {
    match error {
        InvoicingError::Validation { field: actual, .. } => {
            assert_eq!(actual, field, "validation failed on the wrong field")
        }
        other => panic!("expected validation error on {field}, got {other}"),
    }
}

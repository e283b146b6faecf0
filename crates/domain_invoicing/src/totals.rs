//! Invoice totals aggregation
//!
//! The single place where invoice-level money is computed. The order of the
//! steps matters: tax is applied to the post-discount price, not the raw
//! subtotal.
//!
//! 1. `subtotal        = Σ gross`
//! 2. `total_discount  = Σ (gross − net)`
//! 3. `discounted      = subtotal − total_discount`
//! 4. `tax_amount      = discounted × tax_rate / 100`
//! 5. `total_amount    = discounted + tax_amount`
//!
//! Every step is a sum or a product over unrounded decimals, so the result
//! does not depend on item order and recomputing it is idempotent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{Money, Percentage};

use crate::error::{InvoicingError, InvoicingResult};
use crate::line_item::LineItem;

/// Financial totals derived from an invoice's items and tax rate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of gross amounts (pre-discount)
    pub subtotal: Money,
    /// Sum of per-line discount values
    pub total_discount: Money,
    /// `subtotal - total_discount`, the tax base
    pub discounted_price: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
}

/// Aggregates totals for a non-empty item list
///
/// Fails with a validation error when `items` is empty or the tax rate is
/// outside `0..=100`.
pub fn aggregate_totals(items: &[LineItem], tax_rate_percent: Decimal) -> InvoicingResult<InvoiceTotals> {
    if items.is_empty() {
        return Err(InvoicingError::validation(
            "items",
            "an invoice needs at least one line item",
        ));
    }
    let tax_rate = Percentage::new(tax_rate_percent)
        .map_err(|e| InvoicingError::from_money("tax_rate_percent", e))?;

    Ok(compute_totals(items, tax_rate))
}

/// Aggregation over validated inputs; item amounts are recomputed from
/// their source fields rather than read from the cache
pub(crate) fn compute_totals(items: &[LineItem], tax_rate: Percentage) -> InvoiceTotals {
    let lines: Vec<_> = items.iter().map(LineItem::amounts).collect();

    let subtotal = Money::total(lines.iter().map(|l| l.gross));
    let total_discount = Money::total(lines.iter().map(|l| l.discount()));
    let discounted_price = subtotal - total_discount;
    let tax_amount = discounted_price.percent_of(tax_rate);
    let total_amount = discounted_price + tax_amount;

    debug!(
        items = items.len(),
        %subtotal,
        %total_discount,
        %tax_amount,
        %total_amount,
        "Aggregated invoice totals"
    );

    InvoiceTotals {
        subtotal,
        total_discount,
        discounted_price,
        tax_amount,
        total_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::{calculate_line_item, ItemType, LineItemInput};
    use rust_decimal_macros::dec;

    fn item(quantity: Decimal, rate: Decimal, discount: Decimal) -> LineItem {
        calculate_line_item(&LineItemInput {
            item_type: Some(ItemType::Product),
            description: "Widget".to_string(),
            quantity,
            unit: "item".to_string(),
            rate,
            discount_percent: discount,
        })
        .unwrap()
    }

    #[test]
    fn test_tax_applies_after_discount() {
        let items = vec![item(dec!(2), dec!(100), dec!(10)), item(dec!(1), dec!(50), dec!(0))];
        let totals = aggregate_totals(&items, dec!(20)).unwrap();

        assert_eq!(totals.subtotal.amount(), dec!(250));
        assert_eq!(totals.total_discount.amount(), dec!(20));
        assert_eq!(totals.discounted_price.amount(), dec!(230));
        assert_eq!(totals.tax_amount.amount(), dec!(46));
        assert_eq!(totals.total_amount.amount(), dec!(276));
    }

    #[test]
    fn test_empty_items_rejected() {
        let err = aggregate_totals(&[], dec!(10)).unwrap_err();
        assert!(matches!(err, InvoicingError::Validation { ref field, .. } if field == "items"));
    }
}

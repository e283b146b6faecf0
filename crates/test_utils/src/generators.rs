//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::ClientId;
use domain_invoicing::{InvoiceDraft, ItemType, LineItemInput, LifecycleAction};

use crate::builders::InvoiceDraftBuilder;

/// Strategy for currency codes with and without a known symbol
pub fn currency_code_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("USD".to_string()),
        Just("EUR".to_string()),
        Just("GBP".to_string()),
        Just("JPY".to_string()),
        Just("INR".to_string()),
        Just("CHF".to_string()),
        Just("NOK".to_string()),
    ]
}

/// Strategy for quantities between 0.01 and 10,000 with up to 2 decimals
pub fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for rates between 0 and 100,000 with up to 4 decimals
pub fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=1_000_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

/// Strategy for percentages between 0% and 100% with up to 2 decimals
pub fn percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 2))
}

pub fn item_type_strategy() -> impl Strategy<Value = ItemType> {
    prop_oneof![Just(ItemType::Product), Just(ItemType::Service)]
}

pub fn unit_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("ITEM".to_string()),
        Just("hour".to_string()),
        "[a-z]{2,8}",
    ]
}

/// Strategy for valid line item inputs
pub fn line_item_input_strategy() -> impl Strategy<Value = LineItemInput> {
    (
        item_type_strategy(),
        "[A-Za-z][A-Za-z ]{0,30}",
        quantity_strategy(),
        unit_strategy(),
        rate_strategy(),
        percentage_strategy(),
    )
        .prop_map(|(item_type, description, quantity, unit, rate, discount_percent)| LineItemInput {
            item_type: Some(item_type),
            description,
            quantity,
            unit,
            rate,
            discount_percent,
        })
}

/// Strategy for valid drafts with 1 to 10 items
pub fn invoice_draft_strategy() -> impl Strategy<Value = InvoiceDraft> {
    (
        prop::collection::vec(line_item_input_strategy(), 1..=10),
        percentage_strategy(),
        currency_code_strategy(),
    )
        .prop_map(|(items, tax_rate, currency)| {
            InvoiceDraftBuilder::new(ClientId::new())
                .with_items(items)
                .with_tax_rate(tax_rate)
                .with_currency(currency)
                .build()
        })
}

pub fn lifecycle_action_strategy() -> impl Strategy<Value = LifecycleAction> {
    prop_oneof![Just(LifecycleAction::Pay), Just(LifecycleAction::Cancel)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_invoicing::calculate_line_item;

    proptest! {
        #[test]
        fn test_generated_items_are_valid(input in line_item_input_strategy()) {
            prop_assert!(calculate_line_item(&input).is_ok());
        }

        #[test]
        fn test_generated_drafts_are_valid(draft in invoice_draft_strategy()) {
            prop_assert!(domain_invoicing::Invoice::create(draft).is_ok());
        }
    }
}

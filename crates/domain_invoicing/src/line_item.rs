//! Line item calculation
//!
//! A line item's gross amount is `quantity × rate`; its net amount is the
//! gross after the line-level discount percentage. Both are pure functions
//! of the item's own fields.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{LineItemId, Money, Percentage};

use crate::error::{InvoicingError, InvoicingResult};

/// Largest accepted quantity on a single line
pub const MAX_QUANTITY: Decimal = dec!(1000000000);

/// Largest accepted per-unit rate
pub const MAX_RATE: Decimal = dec!(1000000000000);

/// Kind of billable line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Product,
    Service,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::Product => f.write_str("Product"),
            ItemType::Service => f.write_str("Service"),
        }
    }
}

/// Billing unit, normalized to uppercase
///
/// `ITEM` and `HOUR` are the standard units; any other non-empty label is
/// kept as a custom unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    Item,
    Hour,
    Custom(String),
}

impl Unit {
    /// Parses a free-form label; blank labels yield `None`
    pub fn parse(label: &str) -> Option<Unit> {
        let normalized = label.trim().to_uppercase();
        match normalized.as_str() {
            "" => None,
            "ITEM" => Some(Unit::Item),
            "HOUR" => Some(Unit::Hour),
            _ => Some(Unit::Custom(normalized)),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Unit::Item => "ITEM",
            Unit::Hour => "HOUR",
            Unit::Custom(label) => label,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for Unit {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Unit::parse(&value).ok_or_else(|| "unit must not be empty".to_string())
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> String {
        unit.label().to_string()
    }
}

/// Raw line item fields as entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemInput {
    /// Product or service; required
    #[serde(rename = "type")]
    pub item_type: Option<ItemType>,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    /// Price per unit
    pub rate: Decimal,
    /// Line-level discount in percent
    #[serde(default)]
    pub discount_percent: Decimal,
}

/// Gross and net amounts of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    pub gross: Money,
    pub net: Money,
}

impl LineAmounts {
    /// Value removed by the line discount
    pub fn discount(&self) -> Money {
        self.gross - self.net
    }
}

/// Computes gross and net for already-validated inputs
pub fn line_amounts(quantity: Decimal, rate: Money, discount: Percentage) -> LineAmounts {
    let gross = rate.multiply(quantity);
    let net = gross.percent_of(discount.complement());
    LineAmounts { gross, net }
}

/// A validated line item with its derived amounts cached for display
///
/// Deserialization goes through [`LineItemRecord`], so a stored item is
/// validated again and its cached amounts must match the source fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LineItemRecord")]
pub struct LineItem {
    id: LineItemId,
    #[serde(rename = "type")]
    item_type: ItemType,
    description: String,
    quantity: Decimal,
    unit: Unit,
    rate: Money,
    discount_percent: Percentage,
    gross_amount: Money,
    net_amount: Money,
}

impl LineItem {
    /// Validates `input` and builds an item with the given id
    pub fn with_id(id: LineItemId, input: &LineItemInput) -> InvoicingResult<Self> {
        let item_type = input
            .item_type
            .ok_or_else(|| InvoicingError::validation("type", "type is required"))?;

        let description = input.description.trim();
        if description.is_empty() {
            return Err(InvoicingError::validation("description", "description is required"));
        }

        let unit = Unit::parse(&input.unit)
            .ok_or_else(|| InvoicingError::validation("unit", "unit is required"))?;

        if input.quantity <= Decimal::ZERO {
            return Err(InvoicingError::validation("quantity", "quantity must be greater than zero"));
        }
        if input.quantity > MAX_QUANTITY {
            return Err(InvoicingError::validation(
                "quantity",
                format!("quantity must not exceed {MAX_QUANTITY}"),
            ));
        }

        if input.rate < Decimal::ZERO {
            return Err(InvoicingError::validation("rate", "rate must not be negative"));
        }
        if input.rate > MAX_RATE {
            return Err(InvoicingError::validation("rate", format!("rate must not exceed {MAX_RATE}")));
        }

        let discount_percent = Percentage::new(input.discount_percent)
            .map_err(|e| InvoicingError::from_money("discount_percent", e))?;

        let rate = Money::new(input.rate);
        let amounts = line_amounts(input.quantity, rate, discount_percent);

        Ok(Self {
            id,
            item_type,
            description: description.to_string(),
            quantity: input.quantity,
            unit,
            rate,
            discount_percent,
            gross_amount: amounts.gross,
            net_amount: amounts.net,
        })
    }

    pub fn id(&self) -> LineItemId {
        self.id
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn rate(&self) -> Money {
        self.rate
    }

    pub fn discount_percent(&self) -> Percentage {
        self.discount_percent
    }

    /// Cached gross amount
    pub fn gross_amount(&self) -> Money {
        self.gross_amount
    }

    /// Cached net amount
    pub fn net_amount(&self) -> Money {
        self.net_amount
    }

    /// Recomputes gross and net from the source fields, ignoring the cache
    pub fn amounts(&self) -> LineAmounts {
        line_amounts(self.quantity, self.rate, self.discount_percent)
    }
}

/// Stored shape of a line item, checked before it becomes a [`LineItem`]
#[derive(Debug, Deserialize)]
pub struct LineItemRecord {
    id: LineItemId,
    #[serde(rename = "type")]
    item_type: ItemType,
    description: String,
    quantity: Decimal,
    unit: Unit,
    rate: Money,
    discount_percent: Percentage,
    gross_amount: Money,
    net_amount: Money,
}

impl TryFrom<LineItemRecord> for LineItem {
    type Error = InvoicingError;

    fn try_from(record: LineItemRecord) -> Result<Self, Self::Error> {
        let input = LineItemInput {
            item_type: Some(record.item_type),
            description: record.description,
            quantity: record.quantity,
            unit: record.unit.label().to_string(),
            rate: record.rate.amount(),
            discount_percent: record.discount_percent.value(),
        };
        let item = LineItem::with_id(record.id, &input)?;

        if item.gross_amount != record.gross_amount {
            return Err(InvoicingError::validation(
                "gross_amount",
                format!("stored gross {} does not match quantity × rate", record.gross_amount),
            ));
        }
        if item.net_amount != record.net_amount {
            return Err(InvoicingError::validation(
                "net_amount",
                format!("stored net {} does not match the discounted gross", record.net_amount),
            ));
        }
        Ok(item)
    }
}

/// Validates an input and computes its amounts under a fresh id
pub fn calculate_line_item(input: &LineItemInput) -> InvoicingResult<LineItem> {
    LineItem::with_id(LineItemId::new(), input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(quantity: Decimal, rate: Decimal, discount: Decimal) -> LineItemInput {
        LineItemInput {
            item_type: Some(ItemType::Service),
            description: "Consulting".to_string(),
            quantity,
            unit: "hour".to_string(),
            rate,
            discount_percent: discount,
        }
    }

    #[test]
    fn test_gross_and_net() {
        let item = calculate_line_item(&input(dec!(2), dec!(100), dec!(10))).unwrap();
        assert_eq!(item.gross_amount().amount(), dec!(200));
        assert_eq!(item.net_amount().amount(), dec!(180));
        assert_eq!(item.unit(), &Unit::Hour);
    }

    #[test]
    fn test_full_discount_nets_to_zero() {
        let item = calculate_line_item(&input(dec!(3), dec!(40), dec!(100))).unwrap();
        assert!(item.net_amount().is_zero());
    }

    #[test]
    fn test_stored_item_with_edited_net_is_rejected() {
        let item = calculate_line_item(&input(dec!(2), dec!(100), dec!(10))).unwrap();
        let mut json = serde_json::to_value(&item).unwrap();
        assert_eq!(serde_json::from_value::<LineItem>(json.clone()).unwrap(), item);

        json["net_amount"] = serde_json::json!("200");
        let err = serde_json::from_value::<LineItem>(json).unwrap_err();
        assert!(err.to_string().contains("net_amount"));
    }

    #[test]
    fn test_custom_unit_is_uppercased() {
        assert_eq!(Unit::parse(" day "), Some(Unit::Custom("DAY".to_string())));
        assert_eq!(Unit::parse("   "), None);
    }
}

//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::PortError;
use rust_decimal_macros::dec;

#[test]
fn test_core_error_configuration_display() {
    let error = CoreError::configuration("width must be positive");
    assert!(error.to_string().contains("Configuration error"));
}

#[test]
fn test_money_error_names_the_value() {
    let error = MoneyError::InvalidPercentage(dec!(101));
    assert!(error.to_string().contains("101"));
}

#[test]
fn test_port_error_validation_field() {
    match PortError::validation_field("must be an email", "email") {
        PortError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("email")),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_port_error_internal_is_not_transient() {
    assert!(!PortError::internal("boom").is_transient());
}

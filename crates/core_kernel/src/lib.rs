//! Core Kernel - Foundational types and utilities for the invoicing engine
//!
//! This crate provides the fundamental building blocks used by the invoicing domain:
//! - Money and percentage types with precise decimal arithmetic
//! - Display-only currency codes
//! - Strongly-typed identifiers
//! - The error vocabulary shared by every port

pub mod money;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, CurrencyCode, Percentage, MoneyError};
pub use identifiers::{InvoiceId, ClientId, LineItemId};
pub use error::CoreError;
pub use ports::{PortError, DomainPort};

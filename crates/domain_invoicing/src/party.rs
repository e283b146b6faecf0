//! Client and issuer records as supplied by external collaborators
//!
//! The invoicing core never owns these; it receives them already resolved
//! and copies them into the rendering model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::ClientId;

/// The client being billed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClientDetails {
    pub id: ClientId,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub business_name: Option<String>,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub tax_number: Option<String>,
}

impl ClientDetails {
    /// Business name when present, otherwise the contact name
    pub fn display_name(&self) -> &str {
        self.business_name
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// The freelancer's business profile printed in the invoice header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct IssuerProfile {
    #[validate(length(min = 1, message = "business name is required"))]
    pub business_name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[serde(default)]
    #[validate(url(message = "website must be a valid URL"))]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tax_number: Option<String>,
}

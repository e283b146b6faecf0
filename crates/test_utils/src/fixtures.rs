//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the invoicing
//! system. Fixed fixtures are predictable; the `fake_*` variants use the
//! `fake` crate for realistic party data.

use chrono::NaiveDate;
use fake::faker::address::en::{CityName, StreetName};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use core_kernel::ClientId;
use domain_invoicing::{
    ClientDetails, InMemoryInvoiceRepository, InMemoryPartyDirectory, InvoiceNumbering,
    InvoiceService, IssuerProfile, ItemType, LineItemInput,
};

/// Fixture for invoice dates
pub struct DateFixtures;

impl DateFixtures {
    /// Standard issue date (Mar 1, 2024)
    pub fn issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    /// Standard due date (Mar 31, 2024)
    pub fn due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    /// First day the standard invoice is overdue
    pub fn day_after_due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }
}

/// Fixture for line item inputs
pub struct LineItemFixtures;

impl LineItemFixtures {
    /// 2 hours of design at 100 with a 10% discount
    pub fn design_hours() -> LineItemInput {
        Self::service("Design", dec!(2), dec!(100), dec!(10))
    }

    /// 1 hour of review at 50, undiscounted
    pub fn review_hour() -> LineItemInput {
        Self::service("Review", dec!(1), dec!(50), Decimal::ZERO)
    }

    pub fn service(description: &str, quantity: Decimal, rate: Decimal, discount: Decimal) -> LineItemInput {
        LineItemInput {
            item_type: Some(ItemType::Service),
            description: description.to_string(),
            quantity,
            unit: "HOUR".to_string(),
            rate,
            discount_percent: discount,
        }
    }

    pub fn product(description: &str, quantity: Decimal, rate: Decimal) -> LineItemInput {
        LineItemInput {
            item_type: Some(ItemType::Product),
            description: description.to_string(),
            quantity,
            unit: "ITEM".to_string(),
            rate,
            discount_percent: Decimal::ZERO,
        }
    }
}

/// Fixture for client and issuer records
pub struct PartyFixtures;

impl PartyFixtures {
    pub fn client(id: ClientId) -> ClientDetails {
        ClientDetails {
            id,
            name: "Ada Lovelace".to_string(),
            business_name: Some("Analytical Engines Ltd".to_string()),
            address: "12 St James's Square, London".to_string(),
            email: "ada@engines.example".to_string(),
            phone: Some("+44 20 7946 0000".to_string()),
            tax_number: Some("GB123456789".to_string()),
        }
    }

    /// A client with generated name, company and address
    pub fn fake_client(id: ClientId) -> ClientDetails {
        let street: String = StreetName().fake();
        let city: String = CityName().fake();
        ClientDetails {
            id,
            name: Name().fake(),
            business_name: Some(CompanyName().fake()),
            address: format!("{street}, {city}"),
            email: SafeEmail().fake(),
            phone: None,
            tax_number: None,
        }
    }

    pub fn issuer() -> IssuerProfile {
        IssuerProfile {
            business_name: "Hopper Consulting".to_string(),
            contact_name: Some("Grace Hopper".to_string()),
            email: "grace@hopper.example".to_string(),
            phone: "+1 555 0100".to_string(),
            website: Some("https://hopper.example".to_string()),
            address: Some("1 Navy Yard, Arlington".to_string()),
            tax_number: None,
        }
    }
}

/// An invoice service wired to in-memory adapters with one registered client
pub struct TestEnvironment {
    pub service: Arc<InvoiceService>,
    pub directory: Arc<InMemoryPartyDirectory>,
    pub repository: Arc<InMemoryInvoiceRepository>,
    pub client_id: ClientId,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        Self::with_attempts(3).await
    }

    pub async fn with_attempts(max_update_attempts: u32) -> Self {
        let directory = Arc::new(InMemoryPartyDirectory::new());
        let client_id = ClientId::new();
        directory
            .register_client(PartyFixtures::client(client_id))
            .await
            .unwrap();
        directory
            .set_issuer_profile(PartyFixtures::issuer())
            .await
            .unwrap();

        let repository = Arc::new(InMemoryInvoiceRepository::new(InvoiceNumbering::default()));
        let service = Arc::new(InvoiceService::new(
            repository.clone(),
            directory.clone(),
            directory.clone(),
            max_update_attempts,
        ));

        Self {
            service,
            directory,
            repository,
            client_id,
        }
    }

    /// Registers another generated client and returns its id
    pub async fn add_client(&self) -> ClientId {
        let id = ClientId::new();
        self.directory
            .register_client(PartyFixtures::fake_client(id))
            .await
            .unwrap();
        id
    }
}

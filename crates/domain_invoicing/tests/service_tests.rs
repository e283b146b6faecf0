//! Service tests against the in-memory adapters

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use core_kernel::{ClientId, DomainPort, InvoiceId, LineItemId, PortError};

use domain_invoicing::{
    ClientDetails, InMemoryInvoiceRepository, InMemoryPartyDirectory, Invoice, InvoiceDraft,
    InvoiceNumbering, InvoiceRepository, InvoiceService, InvoiceStatus, InvoicingError, IssuerProfile,
    ItemType, LifecycleAction, LineItemInput,
};

fn item(description: &str, quantity: Decimal, rate: Decimal) -> LineItemInput {
    LineItemInput {
        item_type: Some(ItemType::Product),
        description: description.to_string(),
        quantity,
        unit: "item".to_string(),
        rate,
        discount_percent: Decimal::ZERO,
    }
}

fn draft(client_id: ClientId) -> InvoiceDraft {
    InvoiceDraft {
        client_id,
        issue_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
        currency: "EUR".to_string(),
        tax_rate_percent: dec!(10),
        payment_method: "Card".to_string(),
        payment_details: "Pay online".to_string(),
        notes: None,
        items: vec![item("Keyboard", dec!(2), dec!(45))],
    }
}

async fn directory_with_client() -> (Arc<InMemoryPartyDirectory>, ClientId) {
    let directory = Arc::new(InMemoryPartyDirectory::new());
    let client_id = ClientId::new();
    directory
        .register_client(ClientDetails {
            id: client_id,
            name: "Linus".to_string(),
            business_name: None,
            address: "Helsinki".to_string(),
            email: "linus@example.org".to_string(),
            phone: None,
            tax_number: None,
        })
        .await
        .unwrap();
    directory
        .set_issuer_profile(IssuerProfile {
            business_name: "Studio Nine".to_string(),
            contact_name: None,
            email: "billing@studio9.example".to_string(),
            phone: "+44 20 0000 0000".to_string(),
            website: None,
            address: None,
            tax_number: None,
        })
        .await
        .unwrap();
    (directory, client_id)
}

fn service_over(repository: Arc<dyn InvoiceRepository>, directory: Arc<InMemoryPartyDirectory>, attempts: u32) -> InvoiceService {
    InvoiceService::new(repository, directory.clone(), directory, attempts)
}

async fn setup() -> (Arc<InvoiceService>, ClientId) {
    let (directory, client_id) = directory_with_client().await;
    let repository = Arc::new(InMemoryInvoiceRepository::new(InvoiceNumbering::default()));
    (Arc::new(service_over(repository, directory, 3)), client_id)
}

/// Reports a conflict for the first `failures` replaces, then delegates
struct ContendedRepository {
    inner: InMemoryInvoiceRepository,
    failures: u32,
    replace_calls: AtomicU32,
}

impl DomainPort for ContendedRepository {}

#[async_trait]
impl InvoiceRepository for ContendedRepository {
    async fn save_invoice(&self, invoice: Invoice) -> Result<InvoiceId, PortError> {
        self.inner.save_invoice(invoice).await
    }

    async fn load_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        self.inner.load_invoice(id).await
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>, PortError> {
        self.inner.list_invoices().await
    }

    async fn replace_invoice(&self, invoice: &Invoice, expected_version: u64) -> Result<(), PortError> {
        let call = self.replace_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(PortError::conflict("simulated concurrent writer"));
        }
        self.inner.replace_invoice(invoice, expected_version).await
    }
}

mod create_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_identity() {
        let (service, client_id) = setup().await;

        let first = service.create_invoice(draft(client_id)).await.unwrap();
        let second = service.create_invoice(draft(client_id)).await.unwrap();

        assert!(first.id().is_some());
        assert_eq!(first.invoice_number(), Some("INV-0001"));
        assert_eq!(second.invoice_number(), Some("INV-0002"));
        assert_eq!(first.totals().total_amount.amount(), dec!(99));
    }

    #[tokio::test]
    async fn test_create_for_unknown_client() {
        let (service, _) = setup().await;
        let err = service.create_invoice(draft(ClientId::new())).await.unwrap_err();
        assert!(matches!(err, InvoicingError::Port(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_invalid_draft_is_not_stored() {
        let (service, client_id) = setup().await;
        let mut raw = draft(client_id);
        raw.currency = "EURO".to_string();

        let err = service.create_invoice(raw).await.unwrap_err();

        assert!(matches!(err, InvoicingError::Validation { ref field, .. } if field == "currency"));
        assert!(service.list_summaries().await.unwrap().is_empty());
    }
}

mod item_tests {
    use super::*;

    #[tokio::test]
    async fn test_add_edit_remove_items() {
        let (service, client_id) = setup().await;
        let invoice = service.create_invoice(draft(client_id)).await.unwrap();
        let id = invoice.id().unwrap();

        let added = service.add_item(id, item("Mouse", dec!(1), dec!(10))).await.unwrap();
        assert_eq!(added.items().len(), 2);
        assert_eq!(added.totals().subtotal.amount(), dec!(100));

        let mouse = added.items()[1].id();
        let edited = service.edit_item(id, mouse, item("Mouse", dec!(3), dec!(10))).await.unwrap();
        assert_eq!(edited.totals().subtotal.amount(), dec!(120));

        let removed = service.remove_item(id, mouse).await.unwrap();
        assert_eq!(removed.items().len(), 1);
        assert_eq!(removed.totals().total_amount.amount(), dec!(99));

        assert_eq!(service.get_invoice(id).await.unwrap(), removed);
    }

    #[tokio::test]
    async fn test_edit_unknown_item() {
        let (service, client_id) = setup().await;
        let id = service.create_invoice(draft(client_id)).await.unwrap().id().unwrap();

        let err = service
            .edit_item(id, LineItemId::new(), item("Ghost", dec!(1), dec!(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, InvoicingError::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn test_add_item_to_paid_invoice_is_rejected() {
        let (service, client_id) = setup().await;
        let id = service.create_invoice(draft(client_id)).await.unwrap().id().unwrap();
        let paid = service.transition(id, LifecycleAction::Pay).await.unwrap();

        let err = service.add_item(id, item("Late", dec!(1), dec!(1))).await.unwrap_err();

        assert!(matches!(err, InvoicingError::InvoiceLocked { status: InvoiceStatus::Paid }));
        assert_eq!(service.get_invoice(id).await.unwrap(), paid);
    }
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_pay_then_cancel() {
        let (service, client_id) = setup().await;
        let id = service.create_invoice(draft(client_id)).await.unwrap().id().unwrap();

        let paid = service.transition(id, LifecycleAction::Pay).await.unwrap();
        assert_eq!(paid.status(), InvoiceStatus::Paid);
        assert!(paid.payment_date().is_some());

        let err = service.transition(id, LifecycleAction::Cancel).await.unwrap_err();
        assert!(matches!(
            err,
            InvoicingError::InvalidTransition { from: InvoiceStatus::Paid, action: LifecycleAction::Cancel }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_pay_and_cancel_has_one_winner() {
        for _ in 0..25 {
            let (service, client_id) = setup().await;
            let id = service.create_invoice(draft(client_id)).await.unwrap().id().unwrap();

            let pay = tokio::spawn({
                let service = service.clone();
                async move { service.transition(id, LifecycleAction::Pay).await }
            });
            let cancel = tokio::spawn({
                let service = service.clone();
                async move { service.transition(id, LifecycleAction::Cancel).await }
            });
            let results = [pay.await.unwrap(), cancel.await.unwrap()];

            let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
            assert_eq!(winners.len(), 1);
            let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
            assert!(matches!(loser, InvoicingError::InvalidTransition { .. }));

            let stored = service.get_invoice(id).await.unwrap();
            assert_eq!(stored.status(), winners[0].status());
            assert_eq!(stored.payment_date().is_some(), stored.status() == InvoiceStatus::Paid);
        }
    }

    #[tokio::test]
    async fn test_conflict_is_retried_on_fresh_state() {
        let (directory, client_id) = directory_with_client().await;
        let repository = Arc::new(ContendedRepository {
            inner: InMemoryInvoiceRepository::default(),
            failures: 2,
            replace_calls: AtomicU32::new(0),
        });
        let service = service_over(repository.clone(), directory, 3);
        let id = service.create_invoice(draft(client_id)).await.unwrap().id().unwrap();

        let paid = service.transition(id, LifecycleAction::Pay).await.unwrap();

        assert_eq!(paid.status(), InvoiceStatus::Paid);
        assert_eq!(repository.replace_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_conflict_surfaces_after_last_attempt() {
        let (directory, client_id) = directory_with_client().await;
        let repository = Arc::new(ContendedRepository {
            inner: InMemoryInvoiceRepository::default(),
            failures: 5,
            replace_calls: AtomicU32::new(0),
        });
        let service = service_over(repository.clone(), directory, 2);
        let id = service.create_invoice(draft(client_id)).await.unwrap().id().unwrap();

        let err = service.transition(id, LifecycleAction::Pay).await.unwrap_err();

        assert!(matches!(err, InvoicingError::Port(ref e) if e.is_conflict()));
        assert_eq!(repository.replace_calls.load(Ordering::SeqCst), 2);
        assert_eq!(service.get_invoice(id).await.unwrap().status(), InvoiceStatus::Unpaid);
    }
}

mod render_tests {
    use super::*;

    #[tokio::test]
    async fn test_render_resolves_parties() {
        let (service, client_id) = setup().await;
        let id = service.create_invoice(draft(client_id)).await.unwrap().id().unwrap();

        let model = service.render(id).await.unwrap();

        assert_eq!(model.invoice_number.as_deref(), Some("INV-0001"));
        assert_eq!(model.client.name, "Linus");
        assert_eq!(model.issuer.business_name, "Studio Nine");
        assert_eq!(model.totals.total_amount_display, "€99.00");
        assert!(model.watermark.is_none());
    }

    #[tokio::test]
    async fn test_render_cancelled() {
        let (service, client_id) = setup().await;
        let id = service.create_invoice(draft(client_id)).await.unwrap().id().unwrap();
        service.transition(id, LifecycleAction::Cancel).await.unwrap();

        let model = service.render(id).await.unwrap();
        assert_eq!(model.watermark.unwrap().text, "CANCELLED");
    }

    #[tokio::test]
    async fn test_render_unknown_invoice() {
        let (service, _) = setup().await;
        let err = service.render(InvoiceId::new()).await.unwrap_err();
        assert!(matches!(err, InvoicingError::Port(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_list_summaries() {
        let (service, client_id) = setup().await;
        let first = service.create_invoice(draft(client_id)).await.unwrap().id().unwrap();
        service.create_invoice(draft(client_id)).await.unwrap();
        service.transition(first, LifecycleAction::Pay).await.unwrap();

        let summaries = service.list_summaries().await.unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].client_name, "Linus");
        assert_eq!(summaries[0].status, InvoiceStatus::Paid);
        assert!(!summaries[0].can_mark_paid);
        assert!(summaries[1].can_mark_paid);
        assert_eq!(summaries[1].total_display, "€99.00");

        let dashboard = service
            .dashboard(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(dashboard.top_revenue.unwrap().client_id, client_id);
        assert_eq!(dashboard.overdue_count, 1);
    }
}

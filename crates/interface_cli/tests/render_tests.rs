//! Tests for the render front end

use rust_decimal_macros::dec;
use std::path::{Path, PathBuf};

use core_kernel::ClientId;
use domain_invoicing::{InvoiceStatus, InvoicingConfig, InvoicingError, LifecycleAction};
use interface_cli::{run, Args, CliError, ErrorReport, Invocation, RenderRequest};

const DEMO: &str = include_str!("../demos/render_request.json");

fn demo() -> RenderRequest {
    RenderRequest::from_json(DEMO).unwrap()
}

#[tokio::test]
async fn test_demo_request_renders_paid_invoice() {
    let model = run(demo(), &InvoicingConfig::default()).await.unwrap();

    assert_eq!(model.invoice_number.as_deref(), Some("INV-0001"));
    assert_eq!(model.status, InvoiceStatus::Paid);
    assert_eq!(model.totals.amounts.total_amount.amount(), dec!(276));
    assert_eq!(model.totals.total_amount_display, "$276.00");
    assert_eq!(model.watermark.unwrap().text, "PAID");
}

#[tokio::test]
async fn test_without_actions_no_watermark() {
    let mut request = demo();
    request.actions.clear();

    let model = run(request, &InvoicingConfig::default()).await.unwrap();
    let json = serde_json::to_value(&model).unwrap();

    assert_eq!(json["status"], "Unpaid");
    assert!(json.get("watermark").is_none());
}

#[tokio::test]
async fn test_configured_numbering() {
    let config = InvoicingConfig {
        invoice_number_prefix: "ACME".to_string(),
        invoice_number_width: 6,
        ..Default::default()
    };
    let model = run(demo(), &config).await.unwrap();
    assert_eq!(model.invoice_number.as_deref(), Some("ACME-000001"));
}

#[tokio::test]
async fn test_second_action_is_rejected() {
    let mut request = demo();
    request.actions = vec![LifecycleAction::Pay, LifecycleAction::Cancel];

    let err = run(request, &InvoicingConfig::default()).await.unwrap_err();

    assert!(matches!(err, CliError::Invoicing(InvoicingError::InvalidTransition { .. })));
    assert_eq!(err.kind(), "invalid_transition");
    assert_eq!(err.exit_code(), 65);
}

#[tokio::test]
async fn test_client_mismatch() {
    let mut request = demo();
    request.invoice.client_id = ClientId::new();

    let err = run(request, &InvoicingConfig::default()).await.unwrap_err();
    assert!(matches!(err, CliError::ClientMismatch { .. }));
}

#[tokio::test]
async fn test_invalid_client_email() {
    let mut request = demo();
    request.client.email = "not-an-email".to_string();

    let err = run(request, &InvoicingConfig::default()).await.unwrap_err();
    assert_eq!(err.kind(), "port_error");
}

#[tokio::test]
async fn test_validation_report_names_field() {
    let mut request = demo();
    request.invoice.items[0].quantity = dec!(0);

    let err = run(request, &InvoicingConfig::default()).await.unwrap_err();
    let report = ErrorReport::from(&err);

    assert_eq!(report.error, "validation_error");
    assert_eq!(report.field.as_deref(), Some("quantity"));
}

#[test]
fn test_unknown_fields_rejected() {
    let err = RenderRequest::from_json(r#"{"issuer": {}, "surprise": true}"#).unwrap_err();
    assert!(matches!(err, CliError::Request(_)));
    assert_eq!(err.exit_code(), 65);
}

#[test]
fn test_missing_file() {
    let err = RenderRequest::from_path(Path::new("does/not/exist.json")).unwrap_err();
    assert!(matches!(err, CliError::Io { .. }));
    assert_eq!(err.exit_code(), 66);
}

#[test]
fn test_demo_actions_parse_lowercase() {
    assert_eq!(demo().actions, vec![LifecycleAction::Pay]);
}

#[test]
fn test_request_path_argument() {
    match Args::parse_invocation(["invoice-render", "demos/render_request.json"]).unwrap() {
        Invocation::Render(args) => assert_eq!(args.input, PathBuf::from("demos/render_request.json")),
        other => panic!("expected a render invocation, got {other:?}"),
    }
}

#[test]
fn test_missing_request_path_is_usage_error() {
    let err = Args::parse_invocation(["invoice-render"]).unwrap_err();

    assert!(matches!(err, CliError::Usage(_)));
    assert_eq!(err.exit_code(), 64);
    assert_eq!(ErrorReport::from(&err).error, "usage");
}

#[test]
fn test_unknown_flag_is_usage_error() {
    let err = Args::parse_invocation(["invoice-render", "--json", "request.json"]).unwrap_err();

    assert!(matches!(err, CliError::Usage(_)));
    assert_eq!(err.exit_code(), 64);
}

#[test]
fn test_extra_argument_is_usage_error() {
    let err = Args::parse_invocation(["invoice-render", "a.json", "b.json"]).unwrap_err();
    assert_eq!(err.exit_code(), 64);
}

#[test]
fn test_version_flag_is_not_a_path() {
    match Args::parse_invocation(["invoice-render", "--version"]).unwrap() {
        Invocation::Info(text) => assert!(text.contains(env!("CARGO_PKG_VERSION"))),
        other => panic!("expected version text, got {other:?}"),
    }
}

#[test]
fn test_help_flag_describes_input() {
    match Args::parse_invocation(["invoice-render", "--help"]).unwrap() {
        Invocation::Info(text) => assert!(text.contains("<INPUT>")),
        other => panic!("expected help text, got {other:?}"),
    }
}

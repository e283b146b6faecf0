//! Invoice Render Binary
//!
//! Reads a render request as JSON and prints the render model as JSON.
//! Logs go to stderr so stdout stays machine-readable.
//!
//! # Usage
//!
//! ```bash
//! invoice-render demos/render_request.json
//! cat request.json | invoice-render -
//! invoice-render --help
//! ```
//!
//! # Environment Variables
//!
//! * `INVOICING_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `INVOICING_LOG_FORMAT` - text or json (default: text)
//! * `INVOICING_INVOICE_NUMBER_PREFIX` - invoice number prefix (default: INV)
//! * `INVOICING_INVOICE_NUMBER_WIDTH` - zero-padded sequence width (default: 4)
//! * `INVOICING_MAX_UPDATE_ATTEMPTS` - compare-and-set attempts per update (default: 3)

use anyhow::Context;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_invoicing::InvoicingConfig;
use interface_cli::{run, Args, CliError, ErrorReport, Invocation, RenderRequest};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    match execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.downcast_ref::<CliError>().map(CliError::exit_code).unwrap_or(1);
            let report = match err.downcast_ref::<CliError>() {
                Some(cli) => ErrorReport::from(cli),
                None => ErrorReport {
                    error: "error".to_string(),
                    message: format!("{err:#}"),
                    field: None,
                },
            };
            tracing::error!(error = %format!("{err:#}"), "Render failed");
            match serde_json::to_string(&report) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{err:#}"),
            }
            ExitCode::from(code)
        }
    }
}

async fn execute() -> anyhow::Result<()> {
    let args = match Args::parse_invocation(std::env::args_os())? {
        Invocation::Render(args) => args,
        Invocation::Info(text) => {
            print!("{text}");
            return Ok(());
        }
    };

    let config = InvoicingConfig::from_env()
        .map_err(CliError::from)
        .context("loading INVOICING_* configuration")?;
    init_tracing(&config.log_level, &config.log_format);

    tracing::info!(path = %args.input.display(), "Reading render request");
    let request = RenderRequest::from_path(&args.input)?;

    let model = run(request, &config).await?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &model).context("writing render model")?;
    writeln!(stdout).context("writing render model")?;
    Ok(())
}

/// Initializes the tracing subscriber, writing to stderr
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str, log_format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

//! Render request input

use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use domain_invoicing::{ClientDetails, InvoiceDraft, IssuerProfile, LifecycleAction};

use crate::error::CliError;

/// Everything needed to create, settle and render one invoice
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderRequest {
    pub issuer: IssuerProfile,
    pub client: ClientDetails,
    pub invoice: InvoiceDraft,
    /// Applied in order after the invoice is created
    #[serde(default)]
    pub actions: Vec<LifecycleAction>,
}

impl RenderRequest {
    pub fn from_json(text: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a request from a file, or from stdin when `path` is `-`
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let io_error = |source| CliError::Io {
            path: path.display().to_string(),
            source,
        };

        let text = if path == Path::new("-") {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer).map_err(io_error)?;
            buffer
        } else {
            std::fs::read_to_string(path).map_err(io_error)?
        };
        Self::from_json(&text)
    }
}

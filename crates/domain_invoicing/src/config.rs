//! Invoicing configuration

use serde::Deserialize;

use core_kernel::CoreError;

/// Formats sequential invoice numbers such as `INV-0007`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceNumbering {
    pub prefix: String,
    pub width: usize,
}

impl InvoiceNumbering {
    pub fn format(&self, sequence: u64) -> String {
        format!("{}-{:0width$}", self.prefix, sequence, width = self.width)
    }
}

impl Default for InvoiceNumbering {
    fn default() -> Self {
        Self {
            prefix: "INV".to_string(),
            width: 4,
        }
    }
}

/// Invoicing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InvoicingConfig {
    /// Log level
    pub log_level: String,
    /// `text` or `json`
    pub log_format: String,
    /// Prefix of generated invoice numbers
    pub invoice_number_prefix: String,
    /// Zero-padded width of the invoice number sequence
    pub invoice_number_width: usize,
    /// Times an update is re-evaluated after losing a compare-and-set
    pub max_update_attempts: u32,
}

impl Default for InvoicingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            invoice_number_prefix: "INV".to_string(),
            invoice_number_width: 4,
            max_update_attempts: 3,
        }
    }
}

impl InvoicingConfig {
    /// Loads configuration from `INVOICING_*` environment variables over the defaults
    pub fn from_env() -> Result<Self, CoreError> {
        let defaults = Self::default();
        let config: Self = ::config::Config::builder()
            .set_default("log_level", defaults.log_level)
            .and_then(|b| b.set_default("log_format", defaults.log_format))
            .and_then(|b| b.set_default("invoice_number_prefix", defaults.invoice_number_prefix))
            .and_then(|b| b.set_default("invoice_number_width", defaults.invoice_number_width as u64))
            .and_then(|b| b.set_default("max_update_attempts", defaults.max_update_attempts as u64))
            .map_err(|e| CoreError::configuration(e.to_string()))?
            .add_source(::config::Environment::with_prefix("INVOICING").try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CoreError::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges
    pub fn validate(&self) -> Result<(), CoreError> {
        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err(CoreError::configuration("log_format must be \"text\" or \"json\""));
        }
        if self.invoice_number_prefix.trim().is_empty() {
            return Err(CoreError::configuration("invoice_number_prefix must not be empty"));
        }
        if !(1..=12).contains(&self.invoice_number_width) {
            return Err(CoreError::configuration("invoice_number_width must be between 1 and 12"));
        }
        if self.max_update_attempts == 0 {
            return Err(CoreError::configuration("max_update_attempts must be at least 1"));
        }
        Ok(())
    }

    pub fn numbering(&self) -> InvoiceNumbering {
        InvoiceNumbering {
            prefix: self.invoice_number_prefix.trim().to_string(),
            width: self.invoice_number_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_format() {
        let numbering = InvoiceNumbering::default();
        assert_eq!(numbering.format(7), "INV-0007");
        assert_eq!(numbering.format(12345), "INV-12345");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(InvoicingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let config = InvoicingConfig {
            log_format: "xml".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = InvoicingConfig {
            max_update_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

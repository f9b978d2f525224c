//! Ledger configuration loaded from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use gstledger_observability::LogFormat;
use gstledger_parties::Party;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config field '{field}': {message}")]
    Invalid { field: String, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The issuing business.
    pub seller: Party,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub numbering: NumberingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_invoice_dir")]
    pub invoice_dir: PathBuf,
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            invoice_dir: default_invoice_dir(),
            report_path: default_report_path(),
        }
    }
}

fn default_invoice_dir() -> PathBuf {
    PathBuf::from("invoices_pdf")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("reports/GSTR1_Report.csv")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumberingConfig {
    /// Durable counter file. Absent means numbering restarts every run.
    pub sequence_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

impl LedgerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.seller.validate().map_err(|e| ConfigError::Invalid {
            field: "seller".to_string(),
            message: e.to_string(),
        })?;
        if !self.seller.gstin.is_well_formed() {
            tracing::warn!(gstin = %self.seller.gstin, "seller GSTIN does not match the 15-character layout");
        }
        if self.output.report_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "output.report_path".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

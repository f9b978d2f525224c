//! GSTR1 tabular export (CSV).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use gstledger_invoicing::Gstr1Row;

/// Column headers of the GSTR1 B2B template, in order.
pub const GSTR1_HEADERS: [&str; 8] = [
    "GSTIN/UIN of Recipient",
    "Invoice Number",
    "Invoice Date",
    "Invoice Value",
    "Place Of Supply",
    "Rate",
    "Taxable Value",
    "Cess Amount",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Write rows as CSV to any writer. The header row is always written, even
/// for an empty report.
pub fn write_rows<W: io::Write>(writer: W, rows: &[Gstr1Row]) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(GSTR1_HEADERS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes the GSTR1 report to a fixed path.
#[derive(Debug, Clone)]
pub struct Gstr1Writer {
    path: PathBuf,
}

impl Gstr1Writer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create parent directories as needed and write the report.
    pub fn write(&self, rows: &[Gstr1Row]) -> Result<&Path, ExportError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = fs::File::create(&self.path).map_err(|source| ExportError::Io {
            path: self.path.clone(),
            source,
        })?;
        write_rows(io::BufWriter::new(file), rows)?;
        tracing::info!(path = %self.path.display(), rows = rows.len(), "GSTR1 report written");
        Ok(&self.path)
    }
}

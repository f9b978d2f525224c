//! Invoice document rendering.

pub mod pdf;

pub use pdf::PdfInvoiceRenderer;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use gstledger_invoicing::Invoice;
use gstledger_parties::Party;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("pdf backend error: {0}")]
    Pdf(String),
    #[error("invoice {0} has not been issued")]
    NotIssued(String),
}

/// Produces a document for an issued invoice. Read-only over the invoice.
pub trait InvoiceRenderer {
    /// Render and persist; returns where the document was written.
    fn render(&self, seller: &Party, invoice: &Invoice) -> Result<PathBuf, RenderError>;
}

/// Amounts print with two decimals and no grouping, matching the CSV export.
pub(crate) fn money(v: f64) -> String {
    format!("{v:.2}")
}

/// Quantities print without a trailing `.0` when whole.
pub(crate) fn quantity(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

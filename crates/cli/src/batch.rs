//! One batch run: issue, render, settle, remind, export.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use gstledger_infra::{
    Gstr1Writer, InvoiceLedger, InvoiceRenderer, InvoiceSequence, InvoiceStore, Notifier,
    ReminderOutcome,
};
use gstledger_invoicing::{InvoiceCategory, InvoiceNumber, InvoiceStatus, LineItemInput};
use gstledger_parties::Party;

/// Batch file contents (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub invoices: Vec<BatchInvoice>,
    /// Remind buyers of every invoice still unpaid after receipts are applied.
    #[serde(default)]
    pub send_reminders: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInvoice {
    pub buyer: Party,
    #[serde(default, alias = "type")]
    pub category: InvoiceCategory,
    pub items: Vec<LineItemInput>,
    /// Defaults to today.
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    /// Payment already received against this invoice, if any.
    #[serde(default)]
    pub amount_received: Option<f64>,
}

impl Batch {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading batch file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing batch file {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssuedInvoice {
    pub number: InvoiceNumber,
    pub grand_total: f64,
    pub status: InvoiceStatus,
    pub document: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub issued: Vec<IssuedInvoice>,
    pub reminders_sent: usize,
    pub report_path: PathBuf,
}

/// Process a batch against `ledger`. The first failure stops the run.
pub fn run<S, Q>(
    ledger: &mut InvoiceLedger<S, Q>,
    batch: &Batch,
    renderer: &dyn InvoiceRenderer,
    notifier: &dyn Notifier,
    report: &Gstr1Writer,
) -> anyhow::Result<RunSummary>
where
    S: InvoiceStore,
    Q: InvoiceSequence,
{
    let mut issued = Vec::with_capacity(batch.invoices.len());

    for (idx, entry) in batch.invoices.iter().enumerate() {
        let buyer = entry.buyer.clone();
        let items = entry.items.clone();
        let number = match entry.issue_date {
            Some(date) => ledger.create_invoice_on(date, buyer, items, entry.category),
            None => ledger.create_invoice(buyer, items, entry.category),
        }
        .with_context(|| format!("issuing batch invoice #{} for {}", idx + 1, entry.buyer.name))?;

        let invoice = ledger
            .invoice(&number)
            .with_context(|| format!("invoice {number} missing after issue"))?;
        let document = renderer
            .render(ledger.seller(), invoice)
            .with_context(|| format!("rendering invoice {number}"))?;

        if let Some(amount) = entry.amount_received {
            ledger
                .record_receipt(&number, amount)
                .with_context(|| format!("recording receipt for {number}"))?;
        }

        let invoice = ledger
            .invoice(&number)
            .with_context(|| format!("invoice {number} missing after receipt"))?;
        issued.push(IssuedInvoice {
            number: number.clone(),
            grand_total: invoice.grand_total(),
            status: invoice.status(),
            document,
        });
    }

    let mut reminders_sent = 0;
    if batch.send_reminders {
        for number in ledger.unpaid() {
            let outcome = ledger
                .send_email_reminder(&number, notifier)
                .with_context(|| format!("sending reminder for {number}"))?;
            if outcome == ReminderOutcome::Sent {
                reminders_sent += 1;
            }
        }
    }

    let rows = ledger.gstr1_report();
    let report_path = report
        .write(&rows)
        .context("writing GSTR1 report")?
        .to_path_buf();

    tracing::info!(
        invoices = issued.len(),
        reminders_sent,
        report = %report_path.display(),
        "batch complete"
    );

    Ok(RunSummary {
        issued,
        reminders_sent,
        report_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use gstledger_infra::{NotifyError, PaymentReminder, PdfInvoiceRenderer};

    #[derive(Default)]
    struct CountingNotifier {
        count: Cell<usize>,
    }

    impl Notifier for CountingNotifier {
        fn send_reminder(&self, _reminder: &PaymentReminder) -> Result<(), NotifyError> {
            self.count.set(self.count.get() + 1);
            Ok(())
        }
    }

    const BATCH: &str = r#"{
        "send_reminders": true,
        "invoices": [
            {
                "buyer": {"name": "Mumbai Retail", "gstin": "27AABCU9603R1ZM", "address": "Mumbai", "email": "ap@mumbai.example"},
                "issue_date": "2024-01-20",
                "items": [{"desc": "Widget", "hsn_sac": "8471", "qty": 2, "rate": 100, "gst_rate": 18}],
                "amount_received": 236.0
            },
            {
                "buyer": {"name": "Delhi Foods", "gstin": "07AAACB2230M1Z3", "address": "New Delhi", "email": "ap@delhifoods.example"},
                "type": "Services",
                "issue_date": "2024-01-21",
                "items": [{"description": "Support", "hsn_sac": "998713", "quantity": 1, "rate": 500, "gst_rate": 18}]
            }
        ]
    }"#;

    fn seller() -> Party {
        Party::new("Acme Traders", "27AAPFU0939F1ZV", "Pune", "billing@acme.example").unwrap()
    }

    #[test]
    fn runs_a_full_batch() {
        let dir = tempfile::tempdir().unwrap();
        let batch: Batch = serde_json::from_str(BATCH).unwrap();
        let mut ledger = InvoiceLedger::new(seller());
        let renderer = PdfInvoiceRenderer::new(dir.path().join("pdf"));
        let notifier = CountingNotifier::default();
        let report = Gstr1Writer::new(dir.path().join("reports/GSTR1_Report.csv"));

        let summary = run(&mut ledger, &batch, &renderer, &notifier, &report).unwrap();

        assert_eq!(summary.issued.len(), 2);
        assert_eq!(summary.issued[0].number.as_str(), "INV-202401-001");
        assert_eq!(summary.issued[0].status, InvoiceStatus::Paid);
        assert_eq!(summary.issued[1].number.as_str(), "INV-202401-002");
        assert_eq!(summary.issued[1].status, InvoiceStatus::Unpaid);
        assert_eq!(summary.issued[1].grand_total, 590.0);
        assert!(summary.issued.iter().all(|i| i.document.exists()));
        assert_eq!(summary.reminders_sent, 1);
        assert_eq!(notifier.count.get(), 1);
        assert!(summary.report_path.exists());
    }

    #[test]
    fn invalid_item_halts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut batch: Batch = serde_json::from_str(BATCH).unwrap();
        batch.invoices[1].items[0].quantity = -1.0;
        let mut ledger = InvoiceLedger::new(seller());
        let renderer = PdfInvoiceRenderer::new(dir.path().join("pdf"));
        let report = Gstr1Writer::new(dir.path().join("report.csv"));

        let err = run(&mut ledger, &batch, &renderer, &CountingNotifier::default(), &report)
            .unwrap_err();
        assert!(format!("{err:#}").contains("batch invoice #2"));
        assert!(!dir.path().join("report.csv").exists());
    }

    #[test]
    fn batch_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(&path, BATCH).unwrap();
        let batch = Batch::from_file(&path).unwrap();
        assert!(batch.send_reminders);
        assert_eq!(batch.invoices[1].category, InvoiceCategory::Services);
    }
}

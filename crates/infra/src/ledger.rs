//! The invoice ledger: issues invoices, tracks payment status and assembles
//! the GSTR1 export.
//!
//! A ledger is an explicit object owned by the caller's session. All state
//! lives in its store and sequence; nothing is process-global.

use chrono::{Local, NaiveDate, Utc};
use thiserror::Error;

use gstledger_core::{Aggregate, DomainError};
use gstledger_invoicing::{
    Gstr1Row, Invoice, InvoiceCategory, InvoiceCommand, InvoiceNumber, IssueInvoice, IssuePeriod,
    LineItemInput, RecordReceipt, gstr1_rows,
};
use gstledger_parties::Party;

use crate::notify::{NotifyError, Notifier, PaymentReminder};
use crate::sequence::{InMemorySequence, InvoiceSequence, SequenceError};
use crate::store::{InMemoryInvoiceStore, InvoiceStore};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl LedgerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::Domain(e) if e.is_not_found())
    }
}

/// Result of `record_receipt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReceiptOutcome {
    /// The receipt covered the grand total; the invoice is now paid.
    Paid,
    /// The receipt fell short; status unchanged and the amount is not retained.
    Insufficient { shortfall: f64 },
    /// The invoice was already paid; nothing changed.
    AlreadyPaid,
}

/// Result of `send_email_reminder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderOutcome {
    Sent,
    AlreadyPaid,
}

pub struct InvoiceLedger<S = InMemoryInvoiceStore, Q = InMemorySequence> {
    seller: Party,
    store: S,
    sequence: Q,
}

impl InvoiceLedger {
    /// In-memory ledger; numbering follows the count of invoices issued here.
    pub fn new(seller: Party) -> Self {
        Self::with_parts(seller, InMemoryInvoiceStore::new(), InMemorySequence::new())
    }
}

impl<S, Q> InvoiceLedger<S, Q>
where
    S: InvoiceStore,
    Q: InvoiceSequence,
{
    pub fn with_parts(seller: Party, store: S, sequence: Q) -> Self {
        Self {
            seller,
            store,
            sequence,
        }
    }

    pub fn seller(&self) -> &Party {
        &self.seller
    }

    pub fn invoice(&self, number: &InvoiceNumber) -> Option<&Invoice> {
        self.store.get(number)
    }

    pub fn invoices(&self) -> &[Invoice] {
        self.store.list()
    }

    /// Issue an invoice dated today (local time).
    pub fn create_invoice(
        &mut self,
        buyer: Party,
        items: Vec<LineItemInput>,
        category: InvoiceCategory,
    ) -> Result<InvoiceNumber, LedgerError> {
        self.create_invoice_on(Local::now().date_naive(), buyer, items, category)
    }

    /// Issue an invoice with an explicit issue date.
    ///
    /// Inputs are validated before a sequence number is drawn, so rejected
    /// input does not leave a gap in a durable sequence.
    pub fn create_invoice_on(
        &mut self,
        issue_date: NaiveDate,
        buyer: Party,
        items: Vec<LineItemInput>,
        category: InvoiceCategory,
    ) -> Result<InvoiceNumber, LedgerError> {
        buyer.validate()?;
        if items.is_empty() {
            return Err(DomainError::validation("cannot issue invoice without line items").into());
        }
        for item in &items {
            item.validate()?;
        }
        if !buyer.gstin.is_well_formed() {
            tracing::warn!(gstin = %buyer.gstin, buyer = %buyer.name, "buyer GSTIN does not match the 15-character layout");
        }

        let sequence = self.sequence.next_value()?;
        let number = InvoiceNumber::format(IssuePeriod::of(issue_date), sequence);
        if self.store.get(&number).is_some() {
            return Err(DomainError::conflict(format!(
                "invoice number {number} already issued; sequence is behind the ledger"
            ))
            .into());
        }

        let mut invoice = Invoice::empty(number.clone());
        invoice.execute(&InvoiceCommand::IssueInvoice(IssueInvoice {
            invoice_number: number.clone(),
            issue_date,
            category,
            seller_gstin: self.seller.gstin.clone(),
            buyer,
            items,
            occurred_at: Utc::now(),
        }))?;

        tracing::info!(
            invoice = %number,
            supply = ?invoice.supply(),
            items = invoice.items().len(),
            taxable = invoice.total_taxable(),
            tax = invoice.total_tax(),
            grand_total = invoice.grand_total(),
            due_date = %invoice.due_date(),
            "invoice issued"
        );
        for item in invoice.items() {
            tracing::debug!(
                invoice = %number,
                description = %item.description,
                cgst = item.tax.cgst,
                sgst = item.tax.sgst,
                igst = item.tax.igst,
                "line tax split"
            );
        }

        self.store.append(invoice)?;
        Ok(number)
    }

    /// Apply a payment receipt. Only a receipt covering the grand total
    /// changes state. Unknown invoice numbers are `NotFound`.
    pub fn record_receipt(
        &mut self,
        number: &InvoiceNumber,
        amount: f64,
    ) -> Result<ReceiptOutcome, LedgerError> {
        let invoice = self
            .store
            .get_mut(number)
            .ok_or_else(|| DomainError::not_found(format!("invoice {number}")))?;

        if invoice.is_paid() {
            // Still reject malformed amounts on paid invoices.
            invoice.handle(&receipt_command(number, amount))?;
            tracing::info!(invoice = %number, amount, "receipt ignored; invoice already paid");
            return Ok(ReceiptOutcome::AlreadyPaid);
        }

        let events = invoice.execute(&receipt_command(number, amount))?;
        if events.is_empty() {
            let shortfall = invoice.grand_total() - amount;
            tracing::warn!(
                invoice = %number,
                amount,
                grand_total = invoice.grand_total(),
                shortfall,
                "receipt below grand total; status unchanged"
            );
            return Ok(ReceiptOutcome::Insufficient { shortfall });
        }

        tracing::info!(invoice = %number, amount, "invoice paid");
        Ok(ReceiptOutcome::Paid)
    }

    /// Remind the buyer of an unpaid invoice through `notifier`.
    pub fn send_email_reminder(
        &self,
        number: &InvoiceNumber,
        notifier: &dyn Notifier,
    ) -> Result<ReminderOutcome, LedgerError> {
        let invoice = self
            .store
            .get(number)
            .ok_or_else(|| DomainError::not_found(format!("invoice {number}")))?;

        if invoice.is_paid() {
            tracing::debug!(invoice = %number, "reminder skipped; invoice already paid");
            return Ok(ReminderOutcome::AlreadyPaid);
        }

        let buyer = invoice
            .buyer()
            .ok_or_else(|| DomainError::invariant(format!("invoice {number} has no buyer")))?;
        notifier.send_reminder(&PaymentReminder {
            to: buyer.email.clone(),
            buyer_name: buyer.name.clone(),
            invoice_number: number.clone(),
            amount_due: invoice.grand_total(),
            due_date: invoice.due_date(),
        })?;
        Ok(ReminderOutcome::Sent)
    }

    /// Numbers of invoices not yet paid, in issue order.
    pub fn unpaid(&self) -> Vec<InvoiceNumber> {
        self.store
            .list()
            .iter()
            .filter(|inv| !inv.is_paid())
            .map(|inv| inv.number().clone())
            .collect()
    }

    /// One GSTR1 row per (invoice, line item).
    pub fn gstr1_report(&self) -> Vec<Gstr1Row> {
        gstr1_rows(self.store.list())
    }
}

fn receipt_command(number: &InvoiceNumber, amount: f64) -> InvoiceCommand {
    InvoiceCommand::RecordReceipt(RecordReceipt {
        invoice_number: number.clone(),
        amount,
        occurred_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use gstledger_invoicing::{InvoiceStatus, SupplyKind};

    #[derive(Default)]
    struct RecordingNotifier {
        sent: RefCell<Vec<PaymentReminder>>,
    }

    impl Notifier for RecordingNotifier {
        fn send_reminder(&self, reminder: &PaymentReminder) -> Result<(), NotifyError> {
            self.sent.borrow_mut().push(reminder.clone());
            Ok(())
        }
    }

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn send_reminder(&self, reminder: &PaymentReminder) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery {
                to: reminder.to.clone(),
                reason: "mailbox unavailable".to_string(),
            })
        }
    }

    fn seller() -> Party {
        Party::new("Acme Traders", "27AAPFU0939F1ZV", "Pune", "billing@acme.example").unwrap()
    }

    fn local_buyer() -> Party {
        Party::new("Mumbai Retail", "27AABCU9603R1ZM", "Mumbai", "ap@mumbai.example").unwrap()
    }

    fn delhi_buyer() -> Party {
        Party::new("Delhi Foods", "07AAACB2230M1Z3", "New Delhi", "ap@delhifoods.example").unwrap()
    }

    fn widget() -> Vec<LineItemInput> {
        vec![LineItemInput::new("Widget", "8471", 2.0, 100.0, 18.0)]
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn intrastate_invoice_splits_cgst_sgst() {
        let mut ledger = InvoiceLedger::new(seller());
        let number = ledger
            .create_invoice_on(jan(20), local_buyer(), widget(), InvoiceCategory::Goods)
            .unwrap();

        let invoice = ledger.invoice(&number).unwrap();
        assert_eq!(invoice.supply(), SupplyKind::Intrastate);
        assert_eq!(invoice.items()[0].tax.cgst, 18.0);
        assert_eq!(invoice.items()[0].tax.sgst, 18.0);
        assert_eq!(invoice.grand_total(), 236.0);
        assert_eq!(invoice.due_date(), NaiveDate::from_ymd_opt(2024, 2, 4).unwrap());
        assert_eq!(invoice.status(), InvoiceStatus::Unpaid);
    }

    #[test]
    fn interstate_invoice_charges_igst() {
        let mut ledger = InvoiceLedger::new(seller());
        let number = ledger
            .create_invoice_on(jan(20), delhi_buyer(), widget(), InvoiceCategory::Goods)
            .unwrap();

        let item = &ledger.invoice(&number).unwrap().items()[0];
        assert_eq!(item.tax.igst, 36.0);
        assert_eq!(item.tax.cgst, 0.0);
        assert_eq!(item.tax.sgst, 0.0);
    }

    #[test]
    fn numbers_in_a_month_increase_by_one() {
        let mut ledger = InvoiceLedger::new(seller());
        let numbers: Vec<_> = (1..=3)
            .map(|d| {
                ledger
                    .create_invoice_on(jan(d), local_buyer(), widget(), InvoiceCategory::Goods)
                    .unwrap()
            })
            .collect();

        assert_eq!(numbers[0].as_str(), "INV-202401-001");
        assert_eq!(numbers[1].as_str(), "INV-202401-002");
        assert_eq!(numbers[2].as_str(), "INV-202401-003");
        assert_eq!(ledger.invoices().len(), 3);
    }

    #[test]
    fn rejected_input_does_not_consume_a_number() {
        let mut ledger = InvoiceLedger::new(seller());
        let mut bad = widget();
        bad[0].quantity = -2.0;
        let err = ledger
            .create_invoice_on(jan(5), local_buyer(), bad, InvoiceCategory::Goods)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::Validation(_))));

        let err = ledger
            .create_invoice_on(jan(5), local_buyer(), vec![], InvoiceCategory::Goods)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::Validation(_))));

        let number = ledger
            .create_invoice_on(jan(5), local_buyer(), widget(), InvoiceCategory::Goods)
            .unwrap();
        assert_eq!(number.sequence(), 1);
    }

    #[test]
    fn sequence_behind_the_store_is_a_conflict() {
        let mut ledger = InvoiceLedger::new(seller());
        ledger
            .create_invoice_on(jan(5), local_buyer(), widget(), InvoiceCategory::Goods)
            .unwrap();
        ledger.sequence = InMemorySequence::new();

        let err = ledger
            .create_invoice_on(jan(6), local_buyer(), widget(), InvoiceCategory::Goods)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::Conflict(_))));
        assert_eq!(ledger.invoices().len(), 1);
    }

    #[test]
    fn full_receipt_marks_paid() {
        let mut ledger = InvoiceLedger::new(seller());
        let number = ledger
            .create_invoice_on(jan(20), local_buyer(), widget(), InvoiceCategory::Goods)
            .unwrap();

        assert_eq!(ledger.record_receipt(&number, 236.0).unwrap(), ReceiptOutcome::Paid);
        assert!(ledger.invoice(&number).unwrap().is_paid());
        assert_eq!(
            ledger.record_receipt(&number, 236.0).unwrap(),
            ReceiptOutcome::AlreadyPaid
        );
    }

    #[test]
    fn partial_receipt_reports_shortfall() {
        let mut ledger = InvoiceLedger::new(seller());
        let number = ledger
            .create_invoice_on(jan(20), local_buyer(), widget(), InvoiceCategory::Goods)
            .unwrap();

        match ledger.record_receipt(&number, 200.0).unwrap() {
            ReceiptOutcome::Insufficient { shortfall } => assert!((shortfall - 36.0).abs() < 1e-9),
            other => panic!("expected Insufficient, got {other:?}"),
        }
        assert_eq!(ledger.invoice(&number).unwrap().status(), InvoiceStatus::Unpaid);
    }

    #[test]
    fn unknown_invoice_is_not_found() {
        let mut ledger = InvoiceLedger::new(seller());
        let ghost: InvoiceNumber = "INV-202401-099".parse().unwrap();

        assert!(ledger.record_receipt(&ghost, 10.0).unwrap_err().is_not_found());
        let notifier = RecordingNotifier::default();
        assert!(ledger
            .send_email_reminder(&ghost, &notifier)
            .unwrap_err()
            .is_not_found());
        assert!(notifier.sent.borrow().is_empty());
    }

    #[test]
    fn reminders_only_for_unpaid_invoices() {
        let mut ledger = InvoiceLedger::new(seller());
        let unpaid = ledger
            .create_invoice_on(jan(20), delhi_buyer(), widget(), InvoiceCategory::Goods)
            .unwrap();
        let paid = ledger
            .create_invoice_on(jan(21), local_buyer(), widget(), InvoiceCategory::Services)
            .unwrap();
        ledger.record_receipt(&paid, 1_000.0).unwrap();

        let notifier = RecordingNotifier::default();
        assert_eq!(
            ledger.send_email_reminder(&unpaid, &notifier).unwrap(),
            ReminderOutcome::Sent
        );
        assert_eq!(
            ledger.send_email_reminder(&paid, &notifier).unwrap(),
            ReminderOutcome::AlreadyPaid
        );

        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ap@delhifoods.example");
        assert_eq!(sent[0].invoice_number, unpaid);
        assert_eq!(sent[0].amount_due, 236.0);
        assert_eq!(ledger.unpaid(), vec![unpaid]);
    }

    #[test]
    fn notifier_failure_propagates() {
        let mut ledger = InvoiceLedger::new(seller());
        let number = ledger
            .create_invoice_on(jan(20), delhi_buyer(), widget(), InvoiceCategory::Goods)
            .unwrap();
        let err = ledger.send_email_reminder(&number, &FailingNotifier).unwrap_err();
        assert!(matches!(err, LedgerError::Notify(_)));
    }

    #[test]
    fn report_flattens_all_invoices() {
        let mut ledger = InvoiceLedger::new(seller());
        ledger
            .create_invoice_on(
                jan(20),
                local_buyer(),
                vec![
                    LineItemInput::new("Widget", "8471", 2.0, 100.0, 18.0),
                    LineItemInput::new("Cable", "8544", 1.0, 50.0, 12.0),
                ],
                InvoiceCategory::Goods,
            )
            .unwrap();
        ledger
            .create_invoice_on(jan(21), delhi_buyer(), widget(), InvoiceCategory::Goods)
            .unwrap();

        let rows = ledger.gstr1_report();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].place_of_supply, "07");
        assert_eq!(rows[2].invoice_number, "INV-202401-002");
    }
}

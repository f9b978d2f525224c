use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use gstledger_core::{Aggregate, AggregateRoot, DomainError, Event, Gstin};
use gstledger_parties::Party;

use crate::number::InvoiceNumber;
use crate::tax::{self, LineItem, LineItemInput, SupplyKind, TaxSplit};

/// Days between issue date and due date.
pub const PAYMENT_TERMS_DAYS: u64 = 15;

/// Payment status. Only `Unpaid → Paid` is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InvoiceStatus::Unpaid => f.write_str("Unpaid"),
            InvoiceStatus::Paid => f.write_str("Paid"),
        }
    }
}

/// What the invoice bills for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InvoiceCategory {
    #[default]
    Goods,
    Services,
}

impl core::fmt::Display for InvoiceCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InvoiceCategory::Goods => f.write_str("Goods"),
            InvoiceCategory::Services => f.write_str("Services"),
        }
    }
}

/// Aggregate root: Invoice.
///
/// Item data is fixed at issue time; afterwards only `status` changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    number: InvoiceNumber,
    issue_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    category: InvoiceCategory,
    buyer: Option<Party>,
    supply: SupplyKind,
    items: Vec<LineItem>,
    total_taxable: f64,
    total_tax: f64,
    grand_total: f64,
    status: InvoiceStatus,
    version: u64,
    created: bool,
}

impl Invoice {
    /// Create an empty, not-yet-issued aggregate instance.
    pub fn empty(number: InvoiceNumber) -> Self {
        Self {
            number,
            issue_date: None,
            due_date: None,
            category: InvoiceCategory::Goods,
            buyer: None,
            supply: SupplyKind::Intrastate,
            items: Vec::new(),
            total_taxable: 0.0,
            total_tax: 0.0,
            grand_total: 0.0,
            status: InvoiceStatus::Unpaid,
            version: 0,
            created: false,
        }
    }

    pub fn number(&self) -> &InvoiceNumber {
        &self.number
    }

    pub fn is_issued(&self) -> bool {
        self.created
    }

    /// Issue date. Falls back to the Unix epoch only for an unissued aggregate.
    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date.unwrap_or_default()
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date.unwrap_or_default()
    }

    pub fn category(&self) -> InvoiceCategory {
        self.category
    }

    pub fn buyer(&self) -> Option<&Party> {
        self.buyer.as_ref()
    }

    pub fn supply(&self) -> SupplyKind {
        self.supply
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn total_taxable(&self) -> f64 {
        self.total_taxable
    }

    pub fn total_tax(&self) -> f64 {
        self.total_tax
    }

    pub fn grand_total(&self) -> f64 {
        self.grand_total
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    /// Invoice-level CGST/SGST/IGST totals.
    pub fn split_totals(&self) -> TaxSplit {
        self.items
            .iter()
            .fold(TaxSplit::default(), |acc, item| acc.combine(item.tax))
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceNumber;

    fn id(&self) -> &Self::Id {
        &self.number
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: IssueInvoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueInvoice {
    pub invoice_number: InvoiceNumber,
    pub issue_date: NaiveDate,
    pub category: InvoiceCategory,
    pub seller_gstin: Gstin,
    pub buyer: Party,
    pub items: Vec<LineItemInput>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordReceipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordReceipt {
    pub invoice_number: InvoiceNumber,
    pub amount: f64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InvoiceCommand {
    IssueInvoice(IssueInvoice),
    RecordReceipt(RecordReceipt),
}

/// Event: InvoiceIssued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceIssued {
    pub invoice_number: InvoiceNumber,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub category: InvoiceCategory,
    pub buyer: Party,
    pub supply: SupplyKind,
    pub items: Vec<LineItem>,
    pub total_taxable: f64,
    pub total_tax: f64,
    pub grand_total: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoicePaid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoicePaid {
    pub invoice_number: InvoiceNumber,
    pub amount: f64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    InvoiceIssued(InvoiceIssued),
    InvoicePaid(InvoicePaid),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::InvoiceIssued(_) => "invoicing.invoice.issued",
            InvoiceEvent::InvoicePaid(_) => "invoicing.invoice.paid",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::InvoiceIssued(e) => e.occurred_at,
            InvoiceEvent::InvoicePaid(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Invoice {
    type Command = InvoiceCommand;
    type Event = InvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InvoiceEvent::InvoiceIssued(e) => {
                self.number = e.invoice_number.clone();
                self.issue_date = Some(e.issue_date);
                self.due_date = Some(e.due_date);
                self.category = e.category;
                self.buyer = Some(e.buyer.clone());
                self.supply = e.supply;
                self.items = e.items.clone();
                self.total_taxable = e.total_taxable;
                self.total_tax = e.total_tax;
                self.grand_total = e.grand_total;
                self.status = InvoiceStatus::Unpaid;
                self.created = true;
            }
            InvoiceEvent::InvoicePaid(_) => {
                self.status = InvoiceStatus::Paid;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::IssueInvoice(cmd) => self.handle_issue(cmd),
            InvoiceCommand::RecordReceipt(cmd) => self.handle_receipt(cmd),
        }
    }
}

impl Invoice {
    fn ensure_invoice_number(&self, number: &InvoiceNumber) -> Result<(), DomainError> {
        if &self.number != number {
            return Err(DomainError::invariant("invoice_number mismatch"));
        }
        Ok(())
    }

    fn handle_issue(&self, cmd: &IssueInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict(format!(
                "invoice {} already issued",
                self.number
            )));
        }
        self.ensure_invoice_number(&cmd.invoice_number)?;

        let computed = tax::compute(
            &cmd.items,
            &cmd.seller_gstin.state_code(),
            &cmd.buyer.state_code(),
        )?;
        let due_date = cmd
            .issue_date
            .checked_add_days(Days::new(PAYMENT_TERMS_DAYS))
            .ok_or_else(|| DomainError::invariant("due date out of range"))?;

        Ok(vec![InvoiceEvent::InvoiceIssued(InvoiceIssued {
            invoice_number: cmd.invoice_number.clone(),
            issue_date: cmd.issue_date,
            due_date,
            category: cmd.category,
            buyer: cmd.buyer.clone(),
            supply: computed.supply,
            items: computed.items,
            total_taxable: computed.total_taxable,
            total_tax: computed.total_tax,
            grand_total: computed.grand_total,
            occurred_at: cmd.occurred_at,
        })])
    }

    /// A receipt settles the invoice only when it covers the grand total.
    /// Smaller receipts, and receipts against a paid invoice, emit nothing.
    fn handle_receipt(&self, cmd: &RecordReceipt) -> Result<Vec<InvoiceEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("invoice {}", cmd.invoice_number)));
        }
        self.ensure_invoice_number(&cmd.invoice_number)?;

        if !cmd.amount.is_finite() || cmd.amount < 0.0 {
            return Err(DomainError::validation(format!(
                "receipt amount must be a non-negative number (got {})",
                cmd.amount
            )));
        }

        if self.is_paid() || cmd.amount < self.grand_total {
            return Ok(vec![]);
        }

        Ok(vec![InvoiceEvent::InvoicePaid(InvoicePaid {
            invoice_number: cmd.invoice_number.clone(),
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }
}

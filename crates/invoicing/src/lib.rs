//! Invoicing domain module.
//!
//! GST tax computation, the invoice aggregate, invoice numbering and GSTR1 row
//! assembly, implemented purely as deterministic domain logic (no IO, no
//! storage).

pub mod invoice;
pub mod number;
pub mod report;
pub mod tax;

pub use invoice::{
    Invoice, InvoiceCategory, InvoiceCommand, InvoiceEvent, InvoiceIssued, InvoicePaid,
    InvoiceStatus, IssueInvoice, PAYMENT_TERMS_DAYS, RecordReceipt,
};
pub use number::{INVOICE_PREFIX, InvoiceNumber, IssuePeriod};
pub use report::{Gstr1Row, gstr1_rows};
pub use tax::{LineItem, LineItemInput, SupplyKind, TaxComputation, TaxSplit};

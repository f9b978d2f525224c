//! Infrastructure layer: the ledger service, storage, numbering, rendering,
//! export, notification and configuration.

pub mod config;
pub mod export;
pub mod ledger;
pub mod notify;
pub mod render;
pub mod sequence;
pub mod store;

pub use config::{ConfigError, LedgerConfig};
pub use export::{ExportError, Gstr1Writer};
pub use ledger::{InvoiceLedger, LedgerError, ReceiptOutcome, ReminderOutcome};
pub use notify::{LogNotifier, Notifier, NotifyError, PaymentReminder};
pub use render::{InvoiceRenderer, PdfInvoiceRenderer, RenderError};
pub use sequence::{ConfiguredSequence, FileSequence, InMemorySequence, InvoiceSequence, SequenceError};
pub use store::{InMemoryInvoiceStore, InvoiceStore};

//! Invoice storage boundary.
//!
//! The ledger owns its store; there is no process-wide invoice list.

pub mod in_memory;

pub use in_memory::InMemoryInvoiceStore;

use gstledger_core::DomainResult;
use gstledger_invoicing::{Invoice, InvoiceNumber};

/// Ordered, append-only collection of issued invoices.
pub trait InvoiceStore {
    /// Append an issued invoice. Fails with `Conflict` if its number is taken.
    fn append(&mut self, invoice: Invoice) -> DomainResult<()>;

    fn get(&self, number: &InvoiceNumber) -> Option<&Invoice>;

    fn get_mut(&mut self, number: &InvoiceNumber) -> Option<&mut Invoice>;

    /// All invoices in issue order.
    fn list(&self) -> &[Invoice];

    fn len(&self) -> usize {
        self.list().len()
    }

    fn is_empty(&self) -> bool {
        self.list().is_empty()
    }
}

use gstledger_core::{DomainError, DomainResult};
use gstledger_invoicing::{Invoice, InvoiceNumber};

use super::InvoiceStore;

/// In-memory invoice store, alive for the duration of a run.
///
/// Lookups are a linear scan in issue order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryInvoiceStore {
    invoices: Vec<Invoice>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InvoiceStore for InMemoryInvoiceStore {
    fn append(&mut self, invoice: Invoice) -> DomainResult<()> {
        if !invoice.is_issued() {
            return Err(DomainError::invariant(format!(
                "invoice {} has not been issued",
                invoice.number()
            )));
        }
        if self.get(invoice.number()).is_some() {
            return Err(DomainError::conflict(format!(
                "invoice number {} already exists",
                invoice.number()
            )));
        }
        self.invoices.push(invoice);
        Ok(())
    }

    fn get(&self, number: &InvoiceNumber) -> Option<&Invoice> {
        self.invoices.iter().find(|inv| inv.number() == number)
    }

    fn get_mut(&mut self, number: &InvoiceNumber) -> Option<&mut Invoice> {
        self.invoices.iter_mut().find(|inv| inv.number() == number)
    }

    fn list(&self) -> &[Invoice] {
        &self.invoices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use gstledger_core::{Aggregate, Gstin};
    use gstledger_invoicing::{
        InvoiceCategory, InvoiceCommand, IssueInvoice, IssuePeriod, LineItemInput,
    };
    use gstledger_parties::Party;

    fn issued(seq: u64) -> Invoice {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let number = InvoiceNumber::format(IssuePeriod::of(date), seq);
        let mut invoice = Invoice::empty(number.clone());
        invoice
            .execute(&InvoiceCommand::IssueInvoice(IssueInvoice {
                invoice_number: number,
                issue_date: date,
                category: InvoiceCategory::Services,
                seller_gstin: Gstin::parse("27AAPFU0939F1ZV").unwrap(),
                buyer: Party::new("Buyer", "27AABCU9603R1ZM", "Mumbai", "b@buyer.example")
                    .unwrap(),
                items: vec![LineItemInput::new("Consulting", "998311", 1.0, 1000.0, 18.0)],
                occurred_at: Utc::now(),
            }))
            .unwrap();
        invoice
    }

    #[test]
    fn append_preserves_order_and_supports_lookup() {
        let mut store = InMemoryInvoiceStore::new();
        store.append(issued(1)).unwrap();
        store.append(issued(2)).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].number().as_str(), "INV-202405-001");
        let second: InvoiceNumber = "INV-202405-002".parse().unwrap();
        assert!(store.get(&second).is_some());
        assert!(store.get(&"INV-202405-003".parse().unwrap()).is_none());
    }

    #[test]
    fn duplicate_number_is_a_conflict() {
        let mut store = InMemoryInvoiceStore::new();
        store.append(issued(1)).unwrap();
        let err = store.append(issued(1)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unissued_invoice_is_rejected() {
        let mut store = InMemoryInvoiceStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let empty = Invoice::empty(InvoiceNumber::format(IssuePeriod::of(date), 1));
        assert!(store.append(empty).is_err());
        assert!(store.is_empty());
    }
}

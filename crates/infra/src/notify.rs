//! Payment reminder delivery.

use chrono::NaiveDate;
use thiserror::Error;

use gstledger_invoicing::InvoiceNumber;

/// Reminder for an unpaid invoice, addressed to the buyer's email on file.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReminder {
    pub to: String,
    pub buyer_name: String,
    pub invoice_number: InvoiceNumber,
    pub amount_due: f64,
    pub due_date: NaiveDate,
}

impl PaymentReminder {
    pub fn subject(&self) -> String {
        format!("Payment reminder: invoice {}", self.invoice_number)
    }

    pub fn body(&self) -> String {
        format!(
            "Dear {},\n\nInvoice {} for INR {:.2} is due on {}. Please arrange payment at the earliest.\n",
            self.buyer_name, self.invoice_number, self.amount_due, self.due_date
        )
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to deliver reminder to {to}: {reason}")]
    Delivery { to: String, reason: String },
}

/// Outbound notification channel.
pub trait Notifier {
    fn send_reminder(&self, reminder: &PaymentReminder) -> Result<(), NotifyError>;
}

/// Records reminders as structured log events instead of sending mail.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_reminder(&self, reminder: &PaymentReminder) -> Result<(), NotifyError> {
        tracing::info!(
            to = %reminder.to,
            invoice = %reminder.invoice_number,
            amount_due = reminder.amount_due,
            due_date = %reminder.due_date,
            subject = %reminder.subject(),
            "payment reminder sent"
        );
        Ok(())
    }
}

//! GSTR1 row assembly: one row per (invoice, line item).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::invoice::Invoice;

/// One GSTR1 B2B row. Field names serialize to the return template headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gstr1Row {
    #[serde(rename = "GSTIN/UIN of Recipient")]
    pub recipient_gstin: String,
    #[serde(rename = "Invoice Number")]
    pub invoice_number: String,
    #[serde(rename = "Invoice Date")]
    pub invoice_date: NaiveDate,
    #[serde(rename = "Invoice Value")]
    pub invoice_value: f64,
    #[serde(rename = "Place Of Supply")]
    pub place_of_supply: String,
    #[serde(rename = "Rate")]
    pub rate: f64,
    #[serde(rename = "Taxable Value")]
    pub taxable_value: f64,
    #[serde(rename = "Cess Amount")]
    pub cess_amount: f64,
}

/// Flatten invoices into GSTR1 rows, preserving invoice and item order.
///
/// Unissued aggregates carry no buyer and are skipped.
pub fn gstr1_rows<'a>(invoices: impl IntoIterator<Item = &'a Invoice>) -> Vec<Gstr1Row> {
    let mut rows = Vec::new();
    for invoice in invoices {
        let Some(buyer) = invoice.buyer() else {
            continue;
        };
        for item in invoice.items() {
            rows.push(Gstr1Row {
                recipient_gstin: buyer.gstin.to_string(),
                invoice_number: invoice.number().to_string(),
                invoice_date: invoice.issue_date(),
                invoice_value: invoice.grand_total(),
                place_of_supply: buyer.state_code().to_string(),
                rate: item.effective_rate(),
                taxable_value: item.taxable_value,
                cess_amount: 0.0,
            });
        }
    }
    rows
}

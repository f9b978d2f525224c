//! GST tax split per line item.
//!
//! Amounts are plain `f64` rupees. No rounding is applied beyond native
//! floating-point arithmetic; presentation layers format to two decimals.

use serde::{Deserialize, Serialize};

use gstledger_core::{DomainError, DomainResult, StateCode, ValueObject};

/// A line item as supplied by the caller, before tax is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemInput {
    #[serde(alias = "desc")]
    pub description: String,
    /// HSN (goods) or SAC (services) classification code.
    pub hsn_sac: String,
    #[serde(alias = "qty")]
    pub quantity: f64,
    /// Unit rate before tax.
    pub rate: f64,
    /// GST rate in percent, e.g. `18.0`.
    pub gst_rate: f64,
}

impl LineItemInput {
    pub fn new(
        description: impl Into<String>,
        hsn_sac: impl Into<String>,
        quantity: f64,
        rate: f64,
        gst_rate: f64,
    ) -> Self {
        Self {
            description: description.into(),
            hsn_sac: hsn_sac.into(),
            quantity,
            rate,
            gst_rate,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        for (field, value) in [
            ("quantity", self.quantity),
            ("rate", self.rate),
            ("gst_rate", self.gst_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::validation(format!(
                    "line item '{}': {field} must be a non-negative number (got {value})",
                    self.description
                )));
            }
        }
        Ok(())
    }

    pub fn taxable_value(&self) -> f64 {
        self.quantity * self.rate
    }
}

/// Whether a supply stays within one state or crosses state lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyKind {
    /// Same state: tax splits evenly into CGST + SGST.
    Intrastate,
    /// Different states: tax is charged entirely as IGST.
    Interstate,
}

impl SupplyKind {
    pub fn between(seller: &StateCode, buyer: &StateCode) -> Self {
        if seller == buyer {
            SupplyKind::Intrastate
        } else {
            SupplyKind::Interstate
        }
    }
}

/// Three-way GST split of a tax amount.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TaxSplit {
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
}

impl TaxSplit {
    pub fn for_supply(kind: SupplyKind, tax_amount: f64) -> Self {
        match kind {
            SupplyKind::Intrastate => {
                let half = tax_amount / 2.0;
                Self {
                    cgst: half,
                    sgst: half,
                    igst: 0.0,
                }
            }
            SupplyKind::Interstate => Self {
                cgst: 0.0,
                sgst: 0.0,
                igst: tax_amount,
            },
        }
    }

    pub fn total(&self) -> f64 {
        self.cgst + self.sgst + self.igst
    }

    /// Component-wise sum, used for invoice-level breakdowns.
    pub fn combine(self, other: TaxSplit) -> TaxSplit {
        TaxSplit {
            cgst: self.cgst + other.cgst,
            sgst: self.sgst + other.sgst,
            igst: self.igst + other.igst,
        }
    }
}

impl ValueObject for TaxSplit {}

/// A line item with its computed taxable value, tax split and total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub hsn_sac: String,
    pub quantity: f64,
    pub rate: f64,
    pub gst_rate: f64,
    pub taxable_value: f64,
    #[serde(flatten)]
    pub tax: TaxSplit,
    pub total: f64,
}

impl LineItem {
    pub fn tax_amount(&self) -> f64 {
        self.tax.total()
    }

    /// Rate recomputed from the split: `tax / taxable × 100`, or 0 when the
    /// taxable value is zero.
    pub fn effective_rate(&self) -> f64 {
        if self.taxable_value > 0.0 {
            self.tax.total() / self.taxable_value * 100.0
        } else {
            0.0
        }
    }
}

/// Per-item breakdown plus invoice-level sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxComputation {
    pub supply: SupplyKind,
    pub items: Vec<LineItem>,
    pub total_taxable: f64,
    pub total_tax: f64,
    pub grand_total: f64,
}

impl TaxComputation {
    /// Invoice-level CGST/SGST/IGST totals.
    pub fn split_totals(&self) -> TaxSplit {
        self.items
            .iter()
            .fold(TaxSplit::default(), |acc, item| acc.combine(item.tax))
    }
}

pub fn compute_line(input: &LineItemInput, supply: SupplyKind) -> LineItem {
    let taxable_value = input.taxable_value();
    let tax_amount = taxable_value * (input.gst_rate / 100.0);
    LineItem {
        description: input.description.clone(),
        hsn_sac: input.hsn_sac.clone(),
        quantity: input.quantity,
        rate: input.rate,
        gst_rate: input.gst_rate,
        taxable_value,
        tax: TaxSplit::for_supply(supply, tax_amount),
        total: taxable_value + tax_amount,
    }
}

/// Compute every line of an invoice.
///
/// The supply kind is decided once from the two state codes and applied to
/// every item.
pub fn compute(
    items: &[LineItemInput],
    seller: &StateCode,
    buyer: &StateCode,
) -> DomainResult<TaxComputation> {
    if items.is_empty() {
        return Err(DomainError::validation(
            "cannot compute tax for an invoice without line items",
        ));
    }
    for item in items {
        item.validate()?;
    }

    let supply = SupplyKind::between(seller, buyer);
    let mut computed = Vec::with_capacity(items.len());
    let mut total_taxable = 0.0;
    let mut total_tax = 0.0;
    let mut grand_total = 0.0;

    for input in items {
        let line = compute_line(input, supply);
        total_taxable += line.taxable_value;
        total_tax += line.tax_amount();
        grand_total += line.total;
        computed.push(line);
    }

    Ok(TaxComputation {
        supply,
        items: computed,
        total_taxable,
        total_tax,
        grand_total,
    })
}

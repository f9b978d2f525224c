//! Invoice numbering: `INV-{YYYYMM}-{seq:03}`.

use core::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use gstledger_core::DomainError;

pub const INVOICE_PREFIX: &str = "INV";

/// Issue year-month an invoice number is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IssuePeriod {
    pub year: i32,
    pub month: u32,
}

impl IssuePeriod {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl core::fmt::Display for IssuePeriod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

/// Invoice identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Sequence numbers below 1000 are zero-padded to three digits; larger
    /// ones keep all their digits.
    pub fn format(period: IssuePeriod, sequence: u64) -> Self {
        Self(format!("{INVOICE_PREFIX}-{period}-{sequence:03}"))
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        Self::components(raw)?;
        Ok(Self(raw.to_string()))
    }

    fn components(raw: &str) -> Result<(IssuePeriod, u64), DomainError> {
        let bad = || DomainError::invalid_id(format!("'{raw}' is not an invoice number"));
        let mut parts = raw.splitn(3, '-');
        let (Some(prefix), Some(period), Some(seq)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(bad());
        };
        if prefix != INVOICE_PREFIX
            || period.len() != 6
            || !period.bytes().all(|b| b.is_ascii_digit())
            || seq.len() < 3
            || !seq.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(bad());
        }
        let year: i32 = period[..4].parse().map_err(|_| bad())?;
        let month: u32 = period[4..].parse().map_err(|_| bad())?;
        if !(1..=12).contains(&month) {
            return Err(bad());
        }
        let sequence: u64 = seq.parse().map_err(|_| bad())?;
        Ok((IssuePeriod { year, month }, sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn period(&self) -> IssuePeriod {
        // Constructed only through `format`/`parse`, so the layout holds.
        Self::components(&self.0)
            .map(|(period, _)| period)
            .unwrap_or(IssuePeriod { year: 0, month: 0 })
    }

    pub fn sequence(&self) -> u64 {
        Self::components(&self.0).map(|(_, seq)| seq).unwrap_or(0)
    }
}

impl core::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for InvoiceNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for InvoiceNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InvoiceNumber> for String {
    fn from(value: InvoiceNumber) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan_2024() -> IssuePeriod {
        IssuePeriod::of(NaiveDate::from_ymd_opt(2024, 1, 20).unwrap())
    }

    #[test]
    fn formats_with_zero_padded_sequence() {
        assert_eq!(InvoiceNumber::format(jan_2024(), 1).as_str(), "INV-202401-001");
        assert_eq!(InvoiceNumber::format(jan_2024(), 42).as_str(), "INV-202401-042");
        assert_eq!(InvoiceNumber::format(jan_2024(), 1234).as_str(), "INV-202401-1234");
    }

    #[test]
    fn parse_extracts_period_and_sequence() {
        let number: InvoiceNumber = "INV-202401-007".parse().unwrap();
        assert_eq!(number.period(), jan_2024());
        assert_eq!(number.sequence(), 7);
    }

    #[test]
    fn parse_rejects_foreign_layouts() {
        for raw in ["", "INV-2024-001", "BILL-202401-001", "INV-202413-001", "INV-202401-1", "INV-202401-00a"] {
            assert!(
                matches!(InvoiceNumber::parse(raw), Err(DomainError::InvalidId(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn numbers_in_a_period_order_by_sequence() {
        let a = InvoiceNumber::format(jan_2024(), 9);
        let b = InvoiceNumber::format(jan_2024(), 10);
        assert!(a.sequence() < b.sequence());
        assert!(a.as_str() < b.as_str());
    }
}

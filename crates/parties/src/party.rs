use serde::{Deserialize, Serialize};

use gstledger_core::{DomainError, DomainResult, Gstin, StateCode};

/// A GST-registered party: the seller or a buyer on an invoice.
///
/// Identity is the GSTIN; two records with the same GSTIN denote the same
/// registered business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub gstin: Gstin,
    pub address: String,
    pub email: String,
}

impl Party {
    pub fn new(
        name: impl Into<String>,
        gstin: &str,
        address: impl Into<String>,
        email: impl Into<String>,
    ) -> DomainResult<Self> {
        let party = Self {
            name: name.into(),
            gstin: Gstin::parse(gstin)?,
            address: address.into(),
            email: email.into(),
        };
        party.validate()?;
        Ok(party)
    }

    /// Check the fields that `Deserialize` cannot enforce.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("party name must not be empty"));
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation(format!(
                "party '{}' has no usable email address",
                self.name
            )));
        }
        Ok(())
    }

    pub fn state_code(&self) -> StateCode {
        self.gstin.state_code()
    }
}

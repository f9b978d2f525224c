//! GST registration identifier (GSTIN) and the state code it carries.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

const GSTIN_LEN: usize = 15;
const CHECKSUM_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Two-character jurisdiction (state) code, e.g. `27` for Maharashtra.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateCode(String);

impl StateCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for StateCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for StateCode {}

/// GSTIN of a registered party.
///
/// Stored trimmed and upper-cased. Parsing only requires the two characters
/// needed to derive the state code; [`Gstin::is_well_formed`] reports whether
/// the full 15-character layout and checksum hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gstin(String);

impl Gstin {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.chars().count() < 2 {
            return Err(DomainError::validation(format!(
                "GSTIN '{raw}' is too short to carry a state code"
            )));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Jurisdiction code: the first two characters.
    pub fn state_code(&self) -> StateCode {
        StateCode(self.0.chars().take(2).collect())
    }

    pub fn same_state_as(&self, other: &Gstin) -> bool {
        self.state_code() == other.state_code()
    }

    /// Whether the identifier matches the 15-character GSTIN layout:
    /// state digits, PAN (5 letters, 4 digits, 1 letter), entity code, `Z`,
    /// and a valid mod-36 check character.
    pub fn is_well_formed(&self) -> bool {
        let b = self.0.as_bytes();
        if b.len() != GSTIN_LEN {
            return false;
        }
        let layout_ok = b[0..2].iter().all(u8::is_ascii_digit)
            && b[2..7].iter().all(u8::is_ascii_uppercase)
            && b[7..11].iter().all(u8::is_ascii_digit)
            && b[11].is_ascii_uppercase()
            && b[12].is_ascii_alphanumeric()
            && b[13] == b'Z'
            && b[14].is_ascii_alphanumeric();
        layout_ok && checksum_char(&b[..14]) == Some(b[14])
    }
}

fn checksum_char(body: &[u8]) -> Option<u8> {
    let mut sum = 0usize;
    for (i, ch) in body.iter().enumerate() {
        let value = CHECKSUM_ALPHABET.iter().position(|c| c == ch)?;
        let factor = if i % 2 == 0 { 1 } else { 2 };
        let product = value * factor;
        sum += product / 36 + product % 36;
    }
    Some(CHECKSUM_ALPHABET[(36 - sum % 36) % 36])
}

impl ValueObject for Gstin {}

impl core::fmt::Display for Gstin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Gstin {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Gstin {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Gstin> for String {
    fn from(value: Gstin) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_code_is_first_two_characters() {
        let gstin = Gstin::parse("27AAPFU0939F1ZV").unwrap();
        assert_eq!(gstin.state_code().as_str(), "27");
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let gstin = Gstin::parse("  27aapfu0939f1zv ").unwrap();
        assert_eq!(gstin.as_str(), "27AAPFU0939F1ZV");
    }

    #[test]
    fn too_short_identifier_is_rejected() {
        assert!(matches!(Gstin::parse("2"), Err(DomainError::Validation(_))));
        assert!(matches!(Gstin::parse("   "), Err(DomainError::Validation(_))));
    }

    #[test]
    fn short_but_usable_identifier_parses_without_being_well_formed() {
        let gstin = Gstin::parse("07").unwrap();
        assert_eq!(gstin.state_code().as_str(), "07");
        assert!(!gstin.is_well_formed());
    }

    #[test]
    fn checksum_is_verified() {
        assert!(Gstin::parse("27AAPFU0939F1ZV").unwrap().is_well_formed());
        assert!(Gstin::parse("29AAGCB7383J1Z4").unwrap().is_well_formed());
        // Last character altered.
        assert!(!Gstin::parse("27AAPFU0939F1ZW").unwrap().is_well_formed());
    }

    #[test]
    fn same_state_compares_codes_only() {
        let a = Gstin::parse("27AAPFU0939F1ZV").unwrap();
        let b = Gstin::parse("27XYZ").unwrap();
        let c = Gstin::parse("07AAACB2230M1Z3").unwrap();
        assert!(a.same_state_as(&b));
        assert!(!a.same_state_as(&c));
    }

    #[test]
    fn deserialize_rejects_short_values() {
        let ok: Result<Gstin, _> = serde_json::from_str("\"27AAPFU0939F1ZV\"");
        assert!(ok.is_ok());
        let err: Result<Gstin, _> = serde_json::from_str("\"2\"");
        assert!(err.is_err());
    }
}

use crate::error::{CitationError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Code for one citation-issuing authority: a state, a municipality, or a
/// campus ("IL", "NE", "OSU").
///
/// `new` is for trusted literals and normalizes only; parse untrusted input
/// (CLI arguments, configuration) through `FromStr`, which rejects empty
/// codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Jurisdiction(String);

impl Jurisdiction {
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Jurisdiction {
    type Err = CitationError;

    fn from_str(s: &str) -> Result<Self> {
        let jurisdiction = Self::new(s);
        if jurisdiction.0.is_empty() {
            return Err(CitationError::Validation(
                "jurisdiction code must not be empty".to_string(),
            ));
        }
        Ok(jurisdiction)
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A license plate together with the jurisdiction it is registered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plate {
    number: String,
    registered_in: Jurisdiction,
}

impl Plate {
    pub fn new(number: &str, registered_in: Jurisdiction) -> Result<Self> {
        let number = number.trim().to_ascii_uppercase();
        if number.is_empty() {
            return Err(CitationError::Validation(
                "plate number must not be empty".to_string(),
            ));
        }
        Ok(Self {
            number,
            registered_in,
        })
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn registered_in(&self) -> &Jurisdiction {
        &self.registered_in
    }
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number, self.registered_in)
    }
}

/// A non-negative monetary amount as reported by a source.
///
/// Zero is allowed: portals report warning citations with no balance due.
/// The core never computes with amounts, it only passes them through.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self> {
        if value < Decimal::ZERO {
            return Err(CitationError::Validation(
                "citation amount must not be negative".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = CitationError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One citation as reported by its source.
///
/// Immutable once produced: the orchestrator stamps `link` when the source
/// leaves it empty and never touches the financial fields. `status` and
/// `issued` are opaque pass-through strings; their format belongs to the
/// issuing portal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Source-assigned citation identifier, unique within its source.
    pub citation: String,
    pub amount: Amount,
    pub jurisdiction: Jurisdiction,
    /// Human-readable name of the source that reported the citation.
    pub source: String,
    pub status: Option<String>,
    pub issued: Option<String>,
    /// Reference back to the issuing source's portal.
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_jurisdiction_normalization() {
        let jurisdiction: Jurisdiction = " ne ".parse().unwrap();
        assert_eq!(jurisdiction.as_str(), "NE");
        assert_eq!(jurisdiction, Jurisdiction::new("NE"));
    }

    #[test]
    fn test_jurisdiction_rejects_empty() {
        assert!(matches!(
            "  ".parse::<Jurisdiction>(),
            Err(CitationError::Validation(_))
        ));
    }

    #[test]
    fn test_plate_normalization() {
        let plate = Plate::new(" abc123 ", Jurisdiction::new("NE")).unwrap();
        assert_eq!(plate.number(), "ABC123");
        assert_eq!(plate.registered_in().as_str(), "NE");
    }

    #[test]
    fn test_plate_rejects_empty() {
        assert!(matches!(
            Plate::new("", Jurisdiction::new("NE")),
            Err(CitationError::Validation(_))
        ));
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(25.00)).is_ok());
        assert!(Amount::new(dec!(0.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(CitationError::Validation(_))
        ));
    }

    #[test]
    fn test_amount_round_trips_decimal() {
        let amount = Amount::try_from(dec!(45.50)).unwrap();
        assert_eq!(Decimal::from(amount), dec!(45.50));
    }
}

use crate::domain::violation::{Amount, Jurisdiction};
use crate::error::SourceError;

/// A stored payment instrument, passed through opaquely to the issuing
/// portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInstrument {
    pub token: String,
    pub postal_code: Option<String>,
}

/// One payment attempt against the single source owning the citation's
/// jurisdiction. There is no fan-out for payment.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub jurisdiction: Jurisdiction,
    pub citation: String,
    pub amount: Amount,
    pub instrument: Option<PaymentInstrument>,
}

/// Outcome of a payment attempt.
///
/// `CitationNotFound` and `ChargeRejected` are distinct so callers can tell
/// "nothing to pay" from "payment attempt failed" and decide whether a retry
/// is meaningful. When verification finds no outstanding case, the charge
/// step must not have run.
#[derive(Debug)]
pub enum PaymentOutcome {
    Completed { confirmation: Option<String> },
    /// Verification found no outstanding case for the citation.
    CitationNotFound,
    /// Verification passed but the portal refused the charge.
    ChargeRejected { reason: String },
    /// A remote fault interrupted verification or the charge.
    SourceUnavailable(SourceError),
}

impl PaymentOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;

    #[test]
    fn test_only_completed_succeeds() {
        assert!(
            PaymentOutcome::Completed { confirmation: None }.succeeded()
        );
        assert!(!PaymentOutcome::CitationNotFound.succeeded());
        assert!(
            !PaymentOutcome::ChargeRejected {
                reason: "declined".to_string()
            }
            .succeeded()
        );
        assert!(
            !PaymentOutcome::SourceUnavailable(SourceError::Malformed(
                "truncated body".to_string()
            ))
            .succeeded()
        );
    }
}

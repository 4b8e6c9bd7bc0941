//! Illinois circuit clerk e-services portal (JSON API, bearer key).

use crate::domain::payment::{PaymentOutcome, PaymentRequest};
use crate::domain::ports::{CitationFinder, CitationPayer};
use crate::domain::violation::{Amount, Jurisdiction, Plate, Violation};
use crate::error::SourceError;
use crate::infrastructure::http::PortalClient;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

pub const SOURCE_NAME: &str = "Illinois Circuit Clerk e-Services";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    cases: Vec<CaseRecord>,
}

#[derive(Debug, Deserialize)]
struct CaseRecord {
    case_number: String,
    balance_due: Decimal,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    violation_date: Option<String>,
}

fn to_violation(record: CaseRecord, jurisdiction: &Jurisdiction) -> Result<Violation, SourceError> {
    let amount = Amount::new(record.balance_due).map_err(|_| {
        SourceError::Malformed(format!(
            "negative balance on case {}",
            record.case_number
        ))
    })?;
    Ok(Violation {
        citation: record.case_number,
        amount,
        jurisdiction: jurisdiction.clone(),
        source: SOURCE_NAME.to_string(),
        status: record.status,
        issued: record.violation_date,
        link: String::new(),
    })
}

pub struct IllinoisClerkFinder {
    portal: PortalClient,
    jurisdiction: Jurisdiction,
}

impl IllinoisClerkFinder {
    pub fn new(portal: PortalClient) -> Self {
        Self {
            portal,
            jurisdiction: Jurisdiction::new("IL"),
        }
    }
}

#[async_trait]
impl CitationFinder for IllinoisClerkFinder {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }

    fn link(&self) -> &str {
        self.portal.base_url()
    }

    async fn find(&self, plate: &Plate) -> Result<Vec<Violation>, SourceError> {
        let response: SearchResponse = self
            .portal
            .get_json(
                "/api/v1/citations/search",
                &[
                    ("plate", plate.number()),
                    ("plate_state", plate.registered_in().as_str()),
                ],
            )
            .await?;
        response
            .cases
            .into_iter()
            .map(|record| to_violation(record, &self.jurisdiction))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct CaseLookup {
    #[serde(default)]
    case: Option<CaseStatus>,
}

#[derive(Debug, Deserialize)]
struct CaseStatus {
    open: bool,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    accepted: bool,
    #[serde(default)]
    confirmation: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

pub struct IllinoisClerkPayer {
    portal: PortalClient,
    jurisdiction: Jurisdiction,
}

impl IllinoisClerkPayer {
    pub fn new(portal: PortalClient) -> Self {
        Self {
            portal,
            jurisdiction: Jurisdiction::new("IL"),
        }
    }
}

#[async_trait]
impl CitationPayer for IllinoisClerkPayer {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }

    async fn pay(&self, request: &PaymentRequest) -> Result<PaymentOutcome, SourceError> {
        // Verification first: never charge a case the clerk no longer
        // reports as open.
        let lookup: CaseLookup = self
            .portal
            .get_json(&format!("/api/v1/cases/{}", request.citation), &[])
            .await?;
        match lookup.case {
            Some(case) if case.open => {}
            _ => return Ok(PaymentOutcome::CitationNotFound),
        }

        let mut form = vec![
            ("case_number", request.citation.clone()),
            ("amount", request.amount.value().to_string()),
        ];
        if let Some(instrument) = &request.instrument {
            form.push(("card_token", instrument.token.clone()));
            if let Some(postal_code) = &instrument.postal_code {
                form.push(("postal_code", postal_code.clone()));
            }
        }

        let charge: ChargeResponse = self.portal.post_form("/api/v1/payments", &form).await?;
        if charge.accepted {
            Ok(PaymentOutcome::Completed {
                confirmation: charge.confirmation,
            })
        } else {
            Ok(PaymentOutcome::ChargeRejected {
                reason: charge
                    .reason
                    .unwrap_or_else(|| "payment declined".to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_search_response_maps_to_violations() {
        let body = r#"{
            "cases": [
                {
                    "case_number": "2026-TR-004512",
                    "balance_due": 164.00,
                    "status": "DUE",
                    "violation_date": "2026-05-14"
                },
                {
                    "case_number": "2026-TR-009921",
                    "balance_due": "75.50"
                }
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let jurisdiction = Jurisdiction::new("IL");
        let violations: Vec<Violation> = response
            .cases
            .into_iter()
            .map(|record| to_violation(record, &jurisdiction).unwrap())
            .collect();

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].citation, "2026-TR-004512");
        assert_eq!(violations[0].amount.value(), dec!(164.00));
        assert_eq!(violations[0].status.as_deref(), Some("DUE"));
        assert_eq!(violations[1].amount.value(), dec!(75.50));
        assert!(violations[1].status.is_none());
    }

    #[test]
    fn test_negative_balance_is_malformed() {
        let record = CaseRecord {
            case_number: "2026-TR-000001".to_string(),
            balance_due: dec!(-5.00),
            status: None,
            violation_date: None,
        };
        let mapped = to_violation(record, &Jurisdiction::new("IL"));
        assert!(matches!(mapped, Err(SourceError::Malformed(_))));
    }

    #[test]
    fn test_case_lookup_tolerates_missing_case() {
        let lookup: CaseLookup = serde_json::from_str("{}").unwrap();
        assert!(lookup.case.is_none());
    }
}

//! Madison municipal court portal. Search results are paged; payment goes
//! through the court's case API.

use crate::domain::payment::{PaymentOutcome, PaymentRequest};
use crate::domain::ports::{CitationFinder, CitationPayer};
use crate::domain::violation::{Amount, Jurisdiction, Plate, Violation};
use crate::error::SourceError;
use crate::infrastructure::http::PortalClient;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

pub const SOURCE_NAME: &str = "Madison Municipal Court";

/// Upper bound on result pages per query. The portal caps result sets well
/// below this; the bound only guards against a misbehaving remote.
const MAX_PAGES: u32 = 50;

#[derive(Debug, Deserialize)]
struct SearchPage {
    citations: Vec<CourtCitation>,
    #[serde(default)]
    next_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CourtCitation {
    citation_number: String,
    amount_due: Decimal,
    #[serde(default)]
    case_status: Option<String>,
    #[serde(default)]
    violation_date: Option<String>,
}

fn to_violation(record: CourtCitation, jurisdiction: &Jurisdiction) -> Result<Violation, SourceError> {
    let amount = Amount::new(record.amount_due).map_err(|_| {
        SourceError::Malformed(format!(
            "negative amount due on citation {}",
            record.citation_number
        ))
    })?;
    Ok(Violation {
        citation: record.citation_number,
        amount,
        jurisdiction: jurisdiction.clone(),
        source: SOURCE_NAME.to_string(),
        status: record.case_status,
        issued: record.violation_date,
        link: String::new(),
    })
}

pub struct MunicipalCourtFinder {
    portal: PortalClient,
    jurisdiction: Jurisdiction,
}

impl MunicipalCourtFinder {
    pub fn new(portal: PortalClient) -> Self {
        Self {
            portal,
            jurisdiction: Jurisdiction::new("WI"),
        }
    }
}

#[async_trait]
impl CitationFinder for MunicipalCourtFinder {
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
        let mut violations = Vec::new();
        let mut page = 1u32;

        for _ in 0..MAX_PAGES {
            let page_param = page.to_string();
            let response: SearchPage = self
                .portal
                .get_json(
                    "/api/citations",
                    &[
                        ("plate", plate.number()),
                        ("plate_state", plate.registered_in().as_str()),
                        ("page", page_param.as_str()),
                    ],
                )
                .await?;
            for record in response.citations {
                violations.push(to_violation(record, &self.jurisdiction)?);
            }
            match response.next_page {
                Some(next) if next > page => page = next,
                _ => return Ok(violations),
            }
        }
        Ok(violations)
    }
}

#[derive(Debug, Deserialize)]
struct CourtCase {
    #[serde(default)]
    disposition: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CourtChargeResponse {
    status: String,
    #[serde(default)]
    receipt_number: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

pub struct MunicipalCourtPayer {
    portal: PortalClient,
    jurisdiction: Jurisdiction,
}

impl MunicipalCourtPayer {
    pub fn new(portal: PortalClient) -> Self {
        Self {
            portal,
            jurisdiction: Jurisdiction::new("WI"),
        }
    }
}

#[async_trait]
impl CitationPayer for MunicipalCourtPayer {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }

    async fn pay(&self, request: &PaymentRequest) -> Result<PaymentOutcome, SourceError> {
        // The court answers 200 with an empty body for unknown citations, so
        // absence shows up as a missing disposition rather than a 404.
        let case: CourtCase = self
            .portal
            .get_json(&format!("/api/cases/{}", request.citation), &[])
            .await?;
        match case.disposition.as_deref() {
            Some("OPEN") => {}
            _ => return Ok(PaymentOutcome::CitationNotFound),
        }

        let mut form = vec![
            ("citation_number", request.citation.clone()),
            ("amount", request.amount.value().to_string()),
        ];
        if let Some(instrument) = &request.instrument {
            form.push(("card_token", instrument.token.clone()));
            if let Some(postal_code) = &instrument.postal_code {
                form.push(("billing_zip", postal_code.clone()));
            }
        }

        let charge: CourtChargeResponse = self
            .portal
            .post_form(&format!("/api/cases/{}/payments", request.citation), &form)
            .await?;
        match charge.status.as_str() {
            "ACCEPTED" => Ok(PaymentOutcome::Completed {
                confirmation: charge.receipt_number,
            }),
            _ => Ok(PaymentOutcome::ChargeRejected {
                reason: charge
                    .detail
                    .unwrap_or_else(|| format!("charge {}", charge.status.to_lowercase())),
            }),
        }
    }
}

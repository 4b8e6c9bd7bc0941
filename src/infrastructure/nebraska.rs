//! Nebraska sources: the UNL transportation services portal and the Lincoln
//! city treasurer portal. Two independent sources serving one jurisdiction.

use crate::domain::payment::{PaymentOutcome, PaymentRequest};
use crate::domain::ports::{CitationFinder, CitationPayer};
use crate::domain::violation::{Amount, Jurisdiction, Plate, Violation};
use crate::error::SourceError;
use crate::infrastructure::http::PortalClient;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

pub const CAMPUS_SOURCE_NAME: &str = "UNL Transportation Services";
pub const CITY_SOURCE_NAME: &str = "Lincoln City Treasurer";

#[derive(Debug, Deserialize)]
struct CampusCitation {
    citation_number: String,
    fine: Decimal,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    issued_on: Option<String>,
    /// Deep link to the citation, when the portal provides one.
    #[serde(default)]
    url: Option<String>,
}

fn campus_violation(
    record: CampusCitation,
    jurisdiction: &Jurisdiction,
) -> Result<Violation, SourceError> {
    let amount = Amount::new(record.fine).map_err(|_| {
        SourceError::Malformed(format!(
            "negative fine on citation {}",
            record.citation_number
        ))
    })?;
    Ok(Violation {
        citation: record.citation_number,
        amount,
        jurisdiction: jurisdiction.clone(),
        source: CAMPUS_SOURCE_NAME.to_string(),
        status: record.status,
        issued: record.issued_on,
        link: record.url.unwrap_or_default(),
    })
}

/// Campus parking portal. Returns a bare JSON array of citations.
pub struct CampusParkingFinder {
    portal: PortalClient,
    jurisdiction: Jurisdiction,
}

impl CampusParkingFinder {
    pub fn new(portal: PortalClient) -> Self {
        Self {
            portal,
            jurisdiction: Jurisdiction::new("NE"),
        }
    }
}

#[async_trait]
impl CitationFinder for CampusParkingFinder {
    fn name(&self) -> &str {
        CAMPUS_SOURCE_NAME
    }

    fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }

    fn link(&self) -> &str {
        self.portal.base_url()
    }

    async fn find(&self, plate: &Plate) -> Result<Vec<Violation>, SourceError> {
        let citations: Vec<CampusCitation> = self
            .portal
            .get_json(
                "/citations",
                &[
                    ("plate", plate.number()),
                    ("state", plate.registered_in().as_str()),
                ],
            )
            .await?;
        citations
            .into_iter()
            .map(|record| campus_violation(record, &self.jurisdiction))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct CityResponse {
    results: Vec<CityTicket>,
}

#[derive(Debug, Deserialize)]
struct CityTicket {
    ticket: String,
    due: Decimal,
    #[serde(default)]
    disposition: Option<String>,
    #[serde(default)]
    issued: Option<String>,
}

fn city_violation(record: CityTicket, jurisdiction: &Jurisdiction) -> Result<Violation, SourceError> {
    let amount = Amount::new(record.due).map_err(|_| {
        SourceError::Malformed(format!("negative amount due on ticket {}", record.ticket))
    })?;
    Ok(Violation {
        citation: record.ticket,
        amount,
        jurisdiction: jurisdiction.clone(),
        source: CITY_SOURCE_NAME.to_string(),
        status: record.disposition,
        issued: record.issued,
        link: String::new(),
    })
}

/// City treasurer portal: plate search plus ticket payment.
pub struct CityTreasurerFinder {
    portal: PortalClient,
    jurisdiction: Jurisdiction,
}

impl CityTreasurerFinder {
    pub fn new(portal: PortalClient) -> Self {
        Self {
            portal,
            jurisdiction: Jurisdiction::new("NE"),
        }
    }
}

#[async_trait]
impl CitationFinder for CityTreasurerFinder {
    fn name(&self) -> &str {
        CITY_SOURCE_NAME
    }

    fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }

    fn link(&self) -> &str {
        self.portal.base_url()
    }

    async fn find(&self, plate: &Plate) -> Result<Vec<Violation>, SourceError> {
        let response: CityResponse = self
            .portal
            .get_json("/tickets/search", &[("plate", plate.number())])
            .await?;
        response
            .results
            .into_iter()
            .map(|record| city_violation(record, &self.jurisdiction))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct TicketLookup {
    #[serde(default)]
    outstanding: bool,
}

#[derive(Debug, Deserialize)]
struct CityChargeResponse {
    paid: bool,
    #[serde(default)]
    receipt: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct CityTreasurerPayer {
    portal: PortalClient,
    jurisdiction: Jurisdiction,
}

impl CityTreasurerPayer {
    pub fn new(portal: PortalClient) -> Self {
        Self {
            portal,
            jurisdiction: Jurisdiction::new("NE"),
        }
    }
}

#[async_trait]
impl CitationPayer for CityTreasurerPayer {
    fn name(&self) -> &str {
        CITY_SOURCE_NAME
    }

    fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }

    async fn pay(&self, request: &PaymentRequest) -> Result<PaymentOutcome, SourceError> {
        let lookup: TicketLookup = self
            .portal
            .get_json(&format!("/tickets/{}", request.citation), &[])
            .await?;
        if !lookup.outstanding {
            return Ok(PaymentOutcome::CitationNotFound);
        }

        let mut form = vec![
            ("ticket", request.citation.clone()),
            ("amount", request.amount.value().to_string()),
        ];
        if let Some(instrument) = &request.instrument {
            form.push(("card_token", instrument.token.clone()));
        }
        let charge: CityChargeResponse = self
            .portal
            .post_form(&format!("/tickets/{}/pay", request.citation), &form)
            .await?;
        if charge.paid {
            Ok(PaymentOutcome::Completed {
                confirmation: charge.receipt,
            })
        } else {
            Ok(PaymentOutcome::ChargeRejected {
                reason: charge
                    .error
                    .unwrap_or_else(|| "payment refused".to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_campus_citation_keeps_portal_deep_link() {
        let body = r#"[
            {
                "citation_number": "P4417823",
                "fine": 20.0,
                "status": "UNPAID",
                "issued_on": "2026-07-02T09:31:00",
                "url": "https://parking.unl.example.edu/citations/P4417823"
            }
        ]"#;
        let citations: Vec<CampusCitation> = serde_json::from_str(body).unwrap();
        let violation =
            campus_violation(citations.into_iter().next().unwrap(), &Jurisdiction::new("NE"))
                .unwrap();

        assert_eq!(violation.citation, "P4417823");
        assert_eq!(violation.amount.value(), dec!(20.0));
        assert_eq!(
            violation.link,
            "https://parking.unl.example.edu/citations/P4417823"
        );
    }

    #[test]
    fn test_campus_citation_without_link_maps_empty() {
        let body = r#"[{"citation_number": "P9", "fine": 10}]"#;
        let citations: Vec<CampusCitation> = serde_json::from_str(body).unwrap();
        let violation =
            campus_violation(citations.into_iter().next().unwrap(), &Jurisdiction::new("NE"))
                .unwrap();
        assert!(violation.link.is_empty());
    }

    #[test]
    fn test_city_ticket_maps_disposition_passthrough() {
        let body = r#"{
            "results": [
                {"ticket": "LNK-30021", "due": "45.00", "disposition": "DELINQUENT", "issued": "04/19/2026"}
            ]
        }"#;
        let response: CityResponse = serde_json::from_str(body).unwrap();
        let violation =
            city_violation(response.results.into_iter().next().unwrap(), &Jurisdiction::new("NE"))
                .unwrap();

        assert_eq!(violation.citation, "LNK-30021");
        assert_eq!(violation.amount.value(), dec!(45.00));
        assert_eq!(violation.status.as_deref(), Some("DELINQUENT"));
        assert_eq!(violation.issued.as_deref(), Some("04/19/2026"));
        assert_eq!(violation.source, CITY_SOURCE_NAME);
    }

    #[test]
    fn test_ticket_lookup_defaults_to_not_outstanding() {
        let lookup: TicketLookup = serde_json::from_str("{}").unwrap();
        assert!(!lookup.outstanding);
    }
}

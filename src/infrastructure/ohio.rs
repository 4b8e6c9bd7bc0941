//! Ohio State CampusParc portal. The search endpoint is a form POST that
//! answers with a JSON row set.

use crate::domain::ports::CitationFinder;
use crate::domain::violation::{Amount, Jurisdiction, Plate, Violation};
use crate::error::SourceError;
use crate::infrastructure::http::PortalClient;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

pub const SOURCE_NAME: &str = "Ohio State CampusParc";

#[derive(Debug, Deserialize)]
struct SearchRows {
    rows: Vec<CitationRow>,
}

#[derive(Debug, Deserialize)]
struct CitationRow {
    #[serde(rename = "citationId")]
    citation_id: String,
    #[serde(rename = "amountDue")]
    amount_due: Decimal,
    #[serde(default, rename = "citationStatus")]
    citation_status: Option<String>,
    #[serde(default, rename = "issueDate")]
    issue_date: Option<String>,
}

fn to_violation(row: CitationRow, jurisdiction: &Jurisdiction) -> Result<Violation, SourceError> {
    let amount = Amount::new(row.amount_due).map_err(|_| {
        SourceError::Malformed(format!("negative amount due on citation {}", row.citation_id))
    })?;
    Ok(Violation {
        citation: row.citation_id,
        amount,
        jurisdiction: jurisdiction.clone(),
        source: SOURCE_NAME.to_string(),
        status: row.citation_status,
        issued: row.issue_date,
        link: String::new(),
    })
}

pub struct CampusParcFinder {
    portal: PortalClient,
    jurisdiction: Jurisdiction,
}

impl CampusParcFinder {
    pub fn new(portal: PortalClient) -> Self {
        Self {
            portal,
            jurisdiction: Jurisdiction::new("OSU"),
        }
    }
}

#[async_trait]
impl CitationFinder for CampusParcFinder {
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
        let form = [
            ("plateNumber", plate.number()),
            ("plateState", plate.registered_in().as_str()),
        ];
        let response: SearchRows = self.portal.post_form("/citations/search", &form).await?;
        response
            .rows
            .into_iter()
            .map(|row| to_violation(row, &self.jurisdiction))
            .collect()
    }
}

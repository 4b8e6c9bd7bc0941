//! Iowa DOT citation export. The portal answers plate queries with a CSV
//! body rather than JSON.

use crate::domain::ports::CitationFinder;
use crate::domain::violation::{Amount, Jurisdiction, Plate, Violation};
use crate::error::SourceError;
use crate::infrastructure::http::PortalClient;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

pub const SOURCE_NAME: &str = "Iowa DOT Citation Export";

#[derive(Debug, Deserialize)]
struct ExportRow {
    citation: String,
    amount: Decimal,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    issued: Option<String>,
}

fn parse_export(body: &str) -> Result<Vec<ExportRow>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());
    reader
        .deserialize()
        .collect::<Result<Vec<ExportRow>, csv::Error>>()
        .map_err(SourceError::from)
}

fn to_violation(row: ExportRow, jurisdiction: &Jurisdiction) -> Result<Violation, SourceError> {
    let amount = Amount::new(row.amount).map_err(|_| {
        SourceError::Malformed(format!("negative amount on citation {}", row.citation))
    })?;
    Ok(Violation {
        citation: row.citation,
        amount,
        jurisdiction: jurisdiction.clone(),
        source: SOURCE_NAME.to_string(),
        status: row.status,
        issued: row.issued,
        link: String::new(),
    })
}

pub struct DotExportFinder {
    portal: PortalClient,
    jurisdiction: Jurisdiction,
}

impl DotExportFinder {
    pub fn new(portal: PortalClient) -> Self {
        Self {
            portal,
            jurisdiction: Jurisdiction::new("IA"),
        }
    }
}

#[async_trait]
impl CitationFinder for DotExportFinder {
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
        let body = self
            .portal
            .get_text(
                "/export/citations",
                &[
                    ("plate", plate.number()),
                    ("plate_state", plate.registered_in().as_str()),
                    ("format", "csv"),
                ],
            )
            .await?;
        parse_export(&body)?
            .into_iter()
            .map(|row| to_violation(row, &self.jurisdiction))
            .collect()
    }
}

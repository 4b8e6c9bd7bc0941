use crate::domain::payment::{PaymentOutcome, PaymentRequest};
use crate::domain::ports::{CitationFinder, CitationPayer};
use crate::domain::violation::{Amount, Jurisdiction, Plate, Violation};
use crate::error::SourceError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A citation source backed by an in-memory table keyed by plate number.
///
/// Uses `Arc<RwLock<HashMap>>` to allow shared concurrent access. Used by
/// tests and for dry runs without network access.
#[derive(Clone)]
pub struct InMemoryFinder {
    name: String,
    jurisdiction: Jurisdiction,
    link: String,
    violations: Arc<RwLock<HashMap<String, Vec<Violation>>>>,
}

impl InMemoryFinder {
    pub fn new(name: &str, jurisdiction: Jurisdiction, link: &str) -> Self {
        Self {
            name: name.to_string(),
            jurisdiction,
            link: link.to_string(),
            violations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn insert(&self, plate_number: &str, violation: Violation) {
        let mut violations = self.violations.write().await;
        violations
            .entry(plate_number.to_string())
            .or_default()
            .push(violation);
    }
}

#[async_trait]
impl CitationFinder for InMemoryFinder {
    fn name(&self) -> &str {
        &self.name
    }

    fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }

    fn link(&self) -> &str {
        &self.link
    }

    async fn find(&self, plate: &Plate) -> Result<Vec<Violation>, SourceError> {
        let violations = self.violations.read().await;
        Ok(violations.get(plate.number()).cloned().unwrap_or_default())
    }
}

/// An outstanding case at an in-memory payment source.
#[derive(Debug, Clone)]
pub struct OpenCase {
    pub citation: String,
    pub balance_due: Amount,
}

/// A payment source backed by an in-memory case table.
///
/// Enforces the verify-then-charge protocol against its own table: paying a
/// citation with no open case returns `CitationNotFound` without touching
/// the settled list.
#[derive(Clone)]
pub struct InMemoryPayer {
    name: String,
    jurisdiction: Jurisdiction,
    cases: Arc<RwLock<HashMap<String, OpenCase>>>,
    settled: Arc<RwLock<Vec<String>>>,
}

impl InMemoryPayer {
    pub fn new(name: &str, jurisdiction: Jurisdiction) -> Self {
        Self {
            name: name.to_string(),
            jurisdiction,
            cases: Arc::new(RwLock::new(HashMap::new())),
            settled: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn add_case(&self, case: OpenCase) {
        let mut cases = self.cases.write().await;
        cases.insert(case.citation.clone(), case);
    }

    pub async fn settled_citations(&self) -> Vec<String> {
        self.settled.read().await.clone()
    }
}

#[async_trait]
impl CitationPayer for InMemoryPayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }

    async fn pay(&self, request: &PaymentRequest) -> Result<PaymentOutcome, SourceError> {
        let mut cases = self.cases.write().await;
        let Some(case) = cases.get(&request.citation) else {
            return Ok(PaymentOutcome::CitationNotFound);
        };
        if request.amount < case.balance_due {
            return Ok(PaymentOutcome::ChargeRejected {
                reason: "amount below balance due".to_string(),
            });
        }

        cases.remove(&request.citation);
        let mut settled = self.settled.write().await;
        settled.push(request.citation.clone());
        Ok(PaymentOutcome::Completed {
            confirmation: Some(format!("MEM-{}", request.citation)),
        })
    }
}

use async_trait::async_trait;
use citescan::domain::payment::{PaymentOutcome, PaymentRequest};
use citescan::domain::ports::{CitationFinder, CitationPayer};
use citescan::domain::violation::{Amount, Jurisdiction, Plate, Violation};
use citescan::error::SourceError;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub fn violation(
    citation: &str,
    amount: Decimal,
    jurisdiction: &Jurisdiction,
    source: &str,
) -> Violation {
    Violation {
        citation: citation.to_string(),
        amount: Amount::new(amount).unwrap(),
        jurisdiction: jurisdiction.clone(),
        source: source.to_string(),
        status: Some("OPEN".to_string()),
        issued: Some("2026-06-01".to_string()),
        link: String::new(),
    }
}

pub enum FindScript {
    Found(Vec<Violation>),
    Fails(String),
    Hangs(Duration),
    Panics(String),
}

/// A scripted lookup source. The `completed` flag flips only when `find`
/// runs to the end, which lets tests observe aborted tasks.
pub struct StubFinder {
    name: String,
    jurisdiction: Jurisdiction,
    link: String,
    script: FindScript,
    completed: Arc<AtomicBool>,
}

impl StubFinder {
    fn new(name: &str, code: &str, script: FindScript) -> Self {
        Self {
            name: name.to_string(),
            jurisdiction: Jurisdiction::new(code),
            link: format!("https://{}.example.gov", code.to_ascii_lowercase()),
            script,
            completed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn found(name: &str, code: &str, violations: Vec<Violation>) -> Self {
        Self::new(name, code, FindScript::Found(violations))
    }

    pub fn failing(name: &str, code: &str, message: &str) -> Self {
        Self::new(name, code, FindScript::Fails(message.to_string()))
    }

    pub fn hanging(name: &str, code: &str, delay: Duration) -> Self {
        Self::new(name, code, FindScript::Hangs(delay))
    }

    pub fn panicking(name: &str, code: &str, message: &str) -> Self {
        Self::new(name, code, FindScript::Panics(message.to_string()))
    }

    pub fn completed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.completed)
    }
}

#[async_trait]
impl CitationFinder for StubFinder {
    fn name(&self) -> &str {
        &self.name
    }

    fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }

    fn link(&self) -> &str {
        &self.link
    }

    async fn find(&self, _plate: &Plate) -> Result<Vec<Violation>, SourceError> {
        match &self.script {
            FindScript::Found(violations) => {
                self.completed.store(true, Ordering::SeqCst);
                Ok(violations.clone())
            }
            FindScript::Fails(message) => Err(SourceError::Malformed(message.clone())),
            FindScript::Hangs(delay) => {
                tokio::time::sleep(*delay).await;
                self.completed.store(true, Ordering::SeqCst);
                Ok(Vec::new())
            }
            FindScript::Panics(message) => panic!("{}", message),
        }
    }
}

pub enum ChargeScript {
    Accept,
    Reject(String),
    Unavailable(String),
}

/// A scripted payment source with its own case table. The charge counter
/// only moves after verification passes, so tests can assert the
/// verify-then-charge ordering.
pub struct StubPayer {
    name: String,
    jurisdiction: Jurisdiction,
    open_cases: Vec<String>,
    script: ChargeScript,
    verification_down: bool,
    charge_calls: Arc<AtomicUsize>,
}

impl StubPayer {
    pub fn new(name: &str, code: &str, open_cases: &[&str], script: ChargeScript) -> Self {
        Self {
            name: name.to_string(),
            jurisdiction: Jurisdiction::new(code),
            open_cases: open_cases.iter().map(|case| case.to_string()).collect(),
            script,
            verification_down: false,
            charge_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The verification endpoint itself errors before any case is seen.
    pub fn with_verification_down(name: &str, code: &str) -> Self {
        let mut payer = Self::new(name, code, &[], ChargeScript::Accept);
        payer.verification_down = true;
        payer
    }

    pub fn charge_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.charge_calls)
    }
}

#[async_trait]
impl CitationPayer for StubPayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }

    async fn pay(&self, request: &PaymentRequest) -> Result<PaymentOutcome, SourceError> {
        if self.verification_down {
            return Err(SourceError::Malformed(
                "verification endpoint down".to_string(),
            ));
        }
        if !self.open_cases.iter().any(|case| case == &request.citation) {
            return Ok(PaymentOutcome::CitationNotFound);
        }

        self.charge_calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            ChargeScript::Accept => Ok(PaymentOutcome::Completed {
                confirmation: Some(format!("STUB-{}", request.citation)),
            }),
            ChargeScript::Reject(reason) => Ok(PaymentOutcome::ChargeRejected {
                reason: reason.clone(),
            }),
            ChargeScript::Unavailable(message) => Err(SourceError::Malformed(message.clone())),
        }
    }
}

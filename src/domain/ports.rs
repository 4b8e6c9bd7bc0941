use crate::domain::payment::{PaymentOutcome, PaymentRequest};
use crate::domain::violation::{Jurisdiction, Plate, Violation};
use crate::error::SourceError;
use async_trait::async_trait;
use std::sync::Arc;

/// A source able to search one jurisdiction's citation records for a plate.
///
/// "No citations for this plate" is `Ok` with an empty vec; `Err` is
/// reserved for the source itself failing (network, remote error, bad
/// payload). Implementations must tolerate concurrent invocation from
/// simultaneous lookup batches and must not assume any call deadline:
/// the orchestrator applies its own.
#[async_trait]
pub trait CitationFinder: Send + Sync {
    /// Stable human-readable source identifier.
    fn name(&self) -> &str;

    /// The single jurisdiction this source serves. Multiple sources may
    /// serve the same jurisdiction.
    fn jurisdiction(&self) -> &Jurisdiction;

    /// Canonical portal URL, stamped onto violations that omit their own.
    fn link(&self) -> &str;

    async fn find(&self, plate: &Plate) -> Result<Vec<Violation>, SourceError>;
}

/// A source able to settle one citation at its issuing jurisdiction.
///
/// `pay` must verify the citation is outstanding before charging: a
/// verification miss returns [`PaymentOutcome::CitationNotFound`] without a
/// charge attempt. `Err` is reserved for remote faults in either step.
#[async_trait]
pub trait CitationPayer: Send + Sync {
    fn name(&self) -> &str;

    fn jurisdiction(&self) -> &Jurisdiction;

    async fn pay(&self, request: &PaymentRequest) -> Result<PaymentOutcome, SourceError>;
}

pub type DynFinder = Arc<dyn CitationFinder>;
pub type DynPayer = Arc<dyn CitationPayer>;

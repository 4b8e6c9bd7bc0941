use crate::application::registry::SourceRegistry;
use crate::domain::lookup::{FailureCause, LookupReport, LookupRequest, SourceFailure};
use crate::domain::payment::{PaymentOutcome, PaymentRequest};
use crate::domain::ports::DynFinder;
use crate::domain::violation::{Plate, Violation};
use crate::error::{CitationError, Result};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

type FindOutcome = (Plate, std::result::Result<Vec<Violation>, FailureCause>);

/// Scatter-gather engine over the registered sources.
///
/// The lookup path fans out one task per resolved finder, isolates each
/// source's failure from its siblings, and merges everything at join time.
/// The payment path routes to the single payer owning a jurisdiction.
pub struct Orchestrator {
    registry: Arc<SourceRegistry>,
    deadline: Duration,
}

impl Orchestrator {
    pub fn new(registry: Arc<SourceRegistry>) -> Self {
        Self {
            registry,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Per-batch deadline: any finder still running when it elapses is
    /// cancelled and reported as a timed-out source.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Queries every finder in the request's scope concurrently and merges
    /// the outcomes.
    ///
    /// Each finder runs in its own task: a failure, panic, or timeout in one
    /// becomes a [`SourceFailure`] without cancelling, delaying, or
    /// corrupting any sibling. Violations returned with an empty `link` are
    /// stamped with their finder's link. The call only fails wholesale when
    /// nothing was queryable: no finder resolved for the scope
    /// ([`CitationError::NoSourcesResolved`]) or every resolved finder
    /// failed ([`CitationError::AllSourcesFailed`]), so "plate is clean"
    /// stays distinguishable from "all sources down".
    ///
    /// Dropping the returned future (caller cancellation) aborts every
    /// in-flight finder task and discards partial results.
    pub async fn lookup(&self, request: &LookupRequest) -> Result<LookupReport> {
        let finders = self.registry.finders_for(&request.scope);
        if finders.is_empty() {
            return Err(CitationError::NoSourcesResolved);
        }
        let queried = finders.len();

        let mut tasks: JoinSet<(DynFinder, FindOutcome)> = JoinSet::new();
        for finder in finders {
            let plate = request.plate.clone();
            let deadline = self.deadline;
            debug!(
                source = finder.name(),
                jurisdiction = %finder.jurisdiction(),
                plate = plate.number(),
                "querying source"
            );
            tasks.spawn(async move {
                let guarded = AssertUnwindSafe(finder.find(&plate)).catch_unwind();
                let outcome = match timeout(deadline, guarded).await {
                    Err(_) => Err(FailureCause::Timeout(deadline)),
                    Ok(Err(panic)) => Err(FailureCause::Panicked(panic_message(panic))),
                    Ok(Ok(Err(source))) => Err(FailureCause::Source(source)),
                    Ok(Ok(Ok(violations))) => Ok(violations),
                };
                (finder, (plate, outcome))
            });
        }

        let mut report = LookupReport::default();
        while let Some(joined) = tasks.join_next().await {
            // Tasks contain their own panics, so a join error can only mean
            // the set is being torn down; there is nothing attributable to
            // report for it.
            let Ok((finder, (plate, outcome))) = joined else {
                continue;
            };
            match outcome {
                Ok(violations) => {
                    for mut violation in violations {
                        if violation.link.is_empty() {
                            violation.link = finder.link().to_string();
                        }
                        report.violations.push(violation);
                    }
                }
                Err(cause) => {
                    warn!(
                        source = finder.name(),
                        jurisdiction = %finder.jurisdiction(),
                        %cause,
                        "source failed"
                    );
                    report.failures.push(SourceFailure {
                        source: finder.name().to_string(),
                        jurisdiction: finder.jurisdiction().clone(),
                        plate: plate.number().to_string(),
                        cause,
                    });
                }
            }
        }

        if report.failures.len() == queried {
            return Err(CitationError::AllSourcesFailed {
                failures: report.failures,
            });
        }

        info!(
            plate = request.plate.number(),
            sources = queried,
            violations = report.violations.len(),
            failures = report.failures.len(),
            "lookup complete"
        );
        Ok(report)
    }

    /// Routes a payment to the single payer owning the request's
    /// jurisdiction.
    ///
    /// No payer registered is a routing error and escalates without any
    /// remote call. A remote fault from the payer folds into
    /// [`PaymentOutcome::SourceUnavailable`]; the orchestrator performs no
    /// retries and propagates outcomes unchanged.
    pub async fn pay(&self, request: &PaymentRequest) -> Result<PaymentOutcome> {
        let Some(payer) = self.registry.payer_for(&request.jurisdiction) else {
            return Err(CitationError::NoPayerRegistered(request.jurisdiction.clone()));
        };

        debug!(
            source = payer.name(),
            citation = %request.citation,
            amount = %request.amount,
            "routing payment"
        );
        match payer.pay(request).await {
            Ok(outcome) => {
                info!(
                    source = payer.name(),
                    citation = %request.citation,
                    succeeded = outcome.succeeded(),
                    "payment attempt finished"
                );
                Ok(outcome)
            }
            Err(cause) => {
                warn!(
                    source = payer.name(),
                    citation = %request.citation,
                    %cause,
                    "payment source unavailable"
                );
                Ok(PaymentOutcome::SourceUnavailable(cause))
            }
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

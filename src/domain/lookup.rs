use crate::domain::violation::{Jurisdiction, Plate, Violation};
use crate::error::SourceError;
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;

/// Which jurisdictions one lookup batch should cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    /// Query every registered source.
    AllRegistered,
    /// Query only sources serving these jurisdictions. Codes without a
    /// registered source contribute nothing.
    Only(BTreeSet<Jurisdiction>),
}

impl SearchScope {
    pub fn only<I>(jurisdictions: I) -> Self
    where
        I: IntoIterator<Item = Jurisdiction>,
    {
        Self::Only(jurisdictions.into_iter().collect())
    }
}

/// One lookup call: a plate and the jurisdictions to search.
#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub plate: Plate,
    pub scope: SearchScope,
}

impl LookupRequest {
    pub fn new(plate: Plate, scope: SearchScope) -> Self {
        Self { plate, scope }
    }

    /// Searches every registered source.
    pub fn all(plate: Plate) -> Self {
        Self::new(plate, SearchScope::AllRegistered)
    }
}

/// Why a single source failed during a batch.
#[derive(Debug, Error)]
pub enum FailureCause {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("source panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// One failed source attempt. Always attributable: the orchestrator records
/// which source failed, for which plate, and why.
#[derive(Debug)]
pub struct SourceFailure {
    pub source: String,
    pub jurisdiction: Jurisdiction,
    pub plate: String,
    pub cause: FailureCause,
}

/// Merged outcome of one scatter-gather batch.
///
/// Violations keep the order their own source returned them in; ordering
/// across sources is completion order. An empty report means every queried
/// source answered and none reported a citation.
#[derive(Debug, Default)]
pub struct LookupReport {
    pub violations: Vec<Violation>,
    pub failures: Vec<SourceFailure>,
}

impl LookupReport {
    /// Every source answered and no citations were reported.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_only_deduplicates() {
        let scope = SearchScope::only([
            Jurisdiction::new("IL"),
            Jurisdiction::new("NE"),
            Jurisdiction::new("IL"),
        ]);
        match scope {
            SearchScope::Only(codes) => assert_eq!(codes.len(), 2),
            SearchScope::AllRegistered => panic!("expected explicit scope"),
        }
    }

    #[test]
    fn test_empty_report_is_clean() {
        assert!(LookupReport::default().is_clean());
    }
}

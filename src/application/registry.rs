use crate::domain::lookup::SearchScope;
use crate::domain::ports::{DynFinder, DynPayer};
use crate::domain::violation::Jurisdiction;
use crate::error::{CitationError, Result};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

/// Maps jurisdictions to the sources serving them.
///
/// Built once at startup, then shared read-only (behind `Arc`) across
/// concurrent lookup batches. Several finders may serve one jurisdiction;
/// payment routing must stay unambiguous, so a second payer for a
/// jurisdiction that already has one is a configuration error.
#[derive(Default)]
pub struct SourceRegistry {
    finders: HashMap<Jurisdiction, Vec<DynFinder>>,
    payers: HashMap<Jurisdiction, DynPayer>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a lookup source. Repeat registrations for the same
    /// jurisdiction append.
    pub fn register_finder(&mut self, finder: DynFinder) {
        self.finders
            .entry(finder.jurisdiction().clone())
            .or_default()
            .push(finder);
    }

    /// Registers a payment source. Rejects a second payer for a
    /// jurisdiction that already has one.
    pub fn register_payer(&mut self, payer: DynPayer) -> Result<()> {
        match self.payers.entry(payer.jurisdiction().clone()) {
            Entry::Occupied(entry) => Err(CitationError::DuplicatePayer(entry.key().clone())),
            Entry::Vacant(slot) => {
                slot.insert(payer);
                Ok(())
            }
        }
    }

    /// Every finder serving the given scope. Jurisdictions without a
    /// registered source simply contribute nothing.
    pub fn finders_for(&self, scope: &SearchScope) -> Vec<DynFinder> {
        match scope {
            SearchScope::AllRegistered => {
                let mut jurisdictions: Vec<&Jurisdiction> = self.finders.keys().collect();
                jurisdictions.sort();
                jurisdictions
                    .into_iter()
                    .flat_map(|code| self.finders[code].iter().cloned())
                    .collect()
            }
            SearchScope::Only(jurisdictions) => jurisdictions
                .iter()
                .flat_map(|code| self.finders.get(code).into_iter().flatten().cloned())
                .collect(),
        }
    }

    pub fn payer_for(&self, jurisdiction: &Jurisdiction) -> Option<DynPayer> {
        self.payers.get(jurisdiction).cloned()
    }

    /// All jurisdictions with at least one registered finder.
    pub fn jurisdictions(&self) -> BTreeSet<Jurisdiction> {
        self.finders.keys().cloned().collect()
    }

    pub fn finder_count(&self) -> usize {
        self.finders.values().map(Vec::len).sum()
    }
}

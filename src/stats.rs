//! Statistics over all classified grids

use crate::error::MutantError;
use crate::storage::ClassificationStore;
use serde::{Deserialize, Serialize};

/// Counts by verdict plus their ratio. Computed per query, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub count_mutant_dna: u64,
    pub count_human_dna: u64,
    pub ratio: f64,
}

impl StatisticsSnapshot {
    pub fn new(count_mutant_dna: u64, count_human_dna: u64) -> Self {
        Self {
            count_mutant_dna,
            count_human_dna,
            ratio: ratio(count_mutant_dna, count_human_dna),
        }
    }
}

/// mutants / humans; with no humans the ratio is the mutant count itself
pub fn ratio(mutants: u64, humans: u64) -> f64 {
    if humans == 0 {
        return mutants as f64;
    }
    mutants as f64 / humans as f64
}

/// Read both counts from the store
pub fn snapshot(store: &dyn ClassificationStore) -> Result<StatisticsSnapshot, MutantError> {
    let mutants = store.count_by_verdict(true)?;
    let humans = store.count_by_verdict(false)?;
    Ok(StatisticsSnapshot::new(mutants, humans))
}

//! Classifier: validated grids in, cached verdicts out
//!
//! Each distinct grid is scored by the detector at most once. Concurrent
//! first sightings of the same fingerprint queue on a per-fingerprint lock;
//! the store's uniqueness constraint backs this up if another writer wins.

use crate::dna::{validate, Detector, Grid, SequenceDetector, ValidationError};
use crate::error::{MutantError, StoreError};
use crate::fingerprint::{Fingerprint, Fingerprinter};
use crate::stats::{self, StatisticsSnapshot};
use crate::storage::{ClassificationRecord, ClassificationStore, InsertOutcome};
use dashmap::DashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

/// What a raw classification request resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Mutant,
    NonMutant,
    Invalid(ValidationError),
}

/// Wire label of an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Mutant,
    NonMutant,
    InvalidInput,
}

impl Outcome {
    pub fn from_verdict(mutant: bool) -> Self {
        if mutant {
            Outcome::Mutant
        } else {
            Outcome::NonMutant
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Mutant => OutcomeKind::Mutant,
            Outcome::NonMutant => OutcomeKind::NonMutant,
            Outcome::Invalid(_) => OutcomeKind::InvalidInput,
        }
    }

    /// 200 mutant, 403 human, 400 invalid input
    pub fn status(&self) -> u16 {
        match self {
            Outcome::Mutant => 200,
            Outcome::NonMutant => 403,
            Outcome::Invalid(_) => 400,
        }
    }
}

pub struct Classifier {
    store: Arc<dyn ClassificationStore>,
    detector: Box<dyn Detector>,
    fingerprinter: Fingerprinter,
    inflight: DashMap<Fingerprint, Arc<Mutex<()>>>,
}

impl Classifier {
    /// Classifier with the run-counting detector.
    ///
    /// Fails with `DigestUnavailable` if the hash self test does not pass.
    pub fn new(store: Arc<dyn ClassificationStore>) -> Result<Self, MutantError> {
        Self::with_detector(store, SequenceDetector)
    }

    pub fn with_detector(
        store: Arc<dyn ClassificationStore>,
        detector: impl Detector + 'static,
    ) -> Result<Self, MutantError> {
        Ok(Self {
            store,
            detector: Box::new(detector),
            fingerprinter: Fingerprinter::new()?,
            inflight: DashMap::new(),
        })
    }

    pub fn store(&self) -> &Arc<dyn ClassificationStore> {
        &self.store
    }

    pub fn fingerprint(&self, grid: &Grid) -> Fingerprint {
        self.fingerprinter.fingerprint(grid)
    }

    /// Validate raw rows and classify them.
    ///
    /// Invalid input is an `Outcome`, not an error: nothing is hashed or
    /// stored for it. Errors are store failures only.
    pub fn analyze<S: AsRef<str>>(&self, rows: &[Option<S>]) -> Result<Outcome, MutantError> {
        match validate(rows) {
            Ok(grid) => Ok(Outcome::from_verdict(self.classify(&grid)?)),
            Err(e) => Ok(Outcome::Invalid(e)),
        }
    }

    /// Verdict for a grid, from the cache when it has been seen before
    pub fn classify(&self, grid: &Grid) -> Result<bool, MutantError> {
        let fingerprint = self.fingerprinter.fingerprint(grid);
        if let Some(record) = self.store.find(&fingerprint)? {
            debug!("Cache hit {}: mutant={}", fingerprint.short(), record.mutant);
            return Ok(record.mutant);
        }

        let slot = Arc::clone(self.inflight.entry(fingerprint.clone()).or_default().value());
        let result = self.classify_first_seen(grid, &fingerprint, &slot);
        drop(slot);
        self.inflight
            .remove_if(&fingerprint, |_, slot| Arc::strong_count(slot) == 1);
        result
    }

    fn classify_first_seen(
        &self,
        grid: &Grid,
        fingerprint: &Fingerprint,
        slot: &Mutex<()>,
    ) -> Result<bool, MutantError> {
        // the lock guards no data, a panic while holding it leaves nothing torn
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(record) = self.store.find(fingerprint)? {
            debug!(
                "Resolved by concurrent request {}: mutant={}",
                fingerprint.short(),
                record.mutant
            );
            return Ok(record.mutant);
        }

        let mutant = self.detector.is_mutant(grid);
        let record = ClassificationRecord::new(fingerprint.clone(), mutant);
        match self.store.insert_if_absent(record)? {
            InsertOutcome::Inserted => {
                info!(
                    "Classified {}x{} DNA {}: mutant={}",
                    grid.size(),
                    grid.size(),
                    fingerprint.short(),
                    mutant
                );
                Ok(mutant)
            }
            InsertOutcome::Conflict => {
                let winner = self.store.find(fingerprint)?.ok_or_else(|| {
                    StoreError::Unavailable(format!(
                        "record {} vanished after insert conflict",
                        fingerprint
                    ))
                })?;
                debug!(
                    "Insert conflict on {}, using stored verdict {}",
                    fingerprint.short(),
                    winner.mutant
                );
                Ok(winner.mutant)
            }
        }
    }

    pub fn stats(&self) -> Result<StatisticsSnapshot, MutantError> {
        stats::snapshot(self.store.as_ref())
    }
}

//! Classification records and the stores that hold them
//!
//! A store maps a grid fingerprint to the verdict computed the first time the
//! grid was seen. Fingerprints are unique: a second insert for the same key is
//! reported as a conflict, never stored.

mod memory;
mod journal;

pub use journal::{JournalStore, ReplaySummary};
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::fingerprint::Fingerprint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached verdict. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub fingerprint: Fingerprint,
    pub mutant: bool,
    pub created_at: DateTime<Utc>,
}

impl ClassificationRecord {
    pub fn new(fingerprint: Fingerprint, mutant: bool) -> Self {
        Self {
            fingerprint,
            mutant,
            created_at: Utc::now(),
        }
    }
}

/// Result of `insert_if_absent`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record with this fingerprint already exists; nothing was written
    Conflict,
}

/// Key-value store with a uniqueness constraint on the fingerprint
pub trait ClassificationStore: Send + Sync {
    fn find(&self, fingerprint: &Fingerprint) -> Result<Option<ClassificationRecord>, StoreError>;

    fn insert_if_absent(&self, record: ClassificationRecord) -> Result<InsertOutcome, StoreError>;

    fn count_by_verdict(&self, mutant: bool) -> Result<u64, StoreError>;

    /// Total number of records
    fn len(&self) -> Result<u64, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Store doubles for exercising failure handling
#[cfg(test)]
pub(crate) enum FaultyStore {
    /// Lookups miss; inserts and counts fail
    Unavailable,
    /// Every insert conflicts but the winner can never be read back
    Forgetful,
}

#[cfg(test)]
impl ClassificationStore for FaultyStore {
    fn find(&self, _: &Fingerprint) -> Result<Option<ClassificationRecord>, StoreError> {
        Ok(None)
    }

    fn insert_if_absent(&self, _: ClassificationRecord) -> Result<InsertOutcome, StoreError> {
        match self {
            FaultyStore::Unavailable => Err(StoreError::Unavailable("disk gone".into())),
            FaultyStore::Forgetful => Ok(InsertOutcome::Conflict),
        }
    }

    fn count_by_verdict(&self, _: bool) -> Result<u64, StoreError> {
        match self {
            FaultyStore::Unavailable => Err(StoreError::Unavailable("disk gone".into())),
            FaultyStore::Forgetful => Ok(0),
        }
    }

    fn len(&self) -> Result<u64, StoreError> {
        Ok(0)
    }
}

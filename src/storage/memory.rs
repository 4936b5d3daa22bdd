//! In-memory record index
//!
//! Sharded map keyed by fingerprint. The vacant-entry shard lock is the
//! uniqueness constraint: check-then-insert for one fingerprint is serialized,
//! other shards stay available.

use super::{ClassificationRecord, ClassificationStore, InsertOutcome};
use crate::error::StoreError;
use crate::fingerprint::Fingerprint;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Records held in memory only; lost on restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<Fingerprint, ClassificationRecord>,
    mutants: AtomicU64,
    humans: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, mutant: bool) -> &AtomicU64 {
        if mutant {
            &self.mutants
        } else {
            &self.humans
        }
    }
}

impl ClassificationStore for MemoryStore {
    fn find(&self, fingerprint: &Fingerprint) -> Result<Option<ClassificationRecord>, StoreError> {
        Ok(self.records.get(fingerprint).map(|r| r.value().clone()))
    }

    fn insert_if_absent(&self, record: ClassificationRecord) -> Result<InsertOutcome, StoreError> {
        match self.records.entry(record.fingerprint.clone()) {
            Entry::Occupied(_) => Ok(InsertOutcome::Conflict),
            Entry::Vacant(slot) => {
                self.counter(record.mutant).fetch_add(1, Ordering::SeqCst);
                slot.insert(record);
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    fn count_by_verdict(&self, mutant: bool) -> Result<u64, StoreError> {
        Ok(self.counter(mutant).load(Ordering::SeqCst))
    }

    fn len(&self) -> Result<u64, StoreError> {
        Ok(self.records.len() as u64)
    }
}

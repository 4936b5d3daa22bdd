//! Mutant DNA detection
//!
//! Classifies NxN grids of DNA bases as mutant (two or more runs of four
//! identical bases) or human, caching every verdict under a SHA256
//! fingerprint of the grid so each distinct grid is scored once, and keeps
//! running statistics over all verdicts.

pub mod dna;
pub mod fingerprint;
pub mod storage;
pub mod classifier;
pub mod stats;
pub mod config;
pub mod error;
pub mod network;

pub use classifier::{Classifier, Outcome, OutcomeKind};
pub use config::{ServiceConfig, StoreConfig};
pub use dna::{validate, Grid, ValidationError};
pub use error::{MutantError, StoreError};
pub use fingerprint::{Fingerprint, Fingerprinter};
pub use stats::StatisticsSnapshot;
pub use storage::{ClassificationRecord, ClassificationStore, JournalStore, MemoryStore};

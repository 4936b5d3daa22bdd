//! Service configuration
//!
//! Defaults, overlaid by `MUTANT_LISTEN` / `MUTANT_STORE` from the
//! environment, overlaid by command line flags in the binary.

use crate::error::StoreError;
use crate::storage::{ClassificationStore, JournalStore, MemoryStore};
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
pub const DEFAULT_JOURNAL: &str = "mutant-records.jsonl";

pub const ENV_LISTEN: &str = "MUTANT_LISTEN";
pub const ENV_STORE: &str = "MUTANT_STORE";

/// Which backend holds classification records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Records vanish with the process
    Memory,
    /// Append-only journal file
    Journal { path: PathBuf },
}

impl StoreConfig {
    /// `memory` selects the in-memory store, anything else is a journal path
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "memory" | ":memory:" => StoreConfig::Memory,
            path => StoreConfig::Journal { path: PathBuf::from(path) },
        }
    }

    pub fn open(&self) -> Result<Arc<dyn ClassificationStore>, StoreError> {
        Ok(match self {
            StoreConfig::Memory => Arc::new(MemoryStore::new()),
            StoreConfig::Journal { path } => Arc::new(JournalStore::open(path)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Address the network service binds to
    pub listen: String,
    pub store: StoreConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            store: StoreConfig::Journal { path: PathBuf::from(DEFAULT_JOURNAL) },
        }
    }
}

impl ServiceConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(listen) = lookup(ENV_LISTEN).filter(|v| !v.trim().is_empty()) {
            config.listen = listen.trim().to_string();
        }
        if let Some(store) = lookup(ENV_STORE).filter(|v| !v.trim().is_empty()) {
            config.store = StoreConfig::parse(&store);
        }
        config
    }

    pub fn open_store(&self) -> Result<Arc<dyn ClassificationStore>, StoreError> {
        self.store.open()
    }
}

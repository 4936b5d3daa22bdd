//! Journal store: durable append-only record log
//!
//! One JSON record per line. The journal is replayed into a `MemoryStore`
//! on open; each insert appends its line before the record becomes visible,
//! so a failed write never leaves a verdict that would be lost on restart.
//!
//! Appends are serialized by the writer lock alone. The index is touched only
//! after the line is on disk, so lookups never wait on file I/O.

use super::memory::MemoryStore;
use super::{ClassificationRecord, ClassificationStore, InsertOutcome};
use crate::error::StoreError;
use crate::fingerprint::Fingerprint;
use log::{info, warn};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Result of replaying a journal file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub loaded: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// Append handle plus whether the file currently ends mid-line
struct JournalWriter {
    file: File,
    torn: bool,
}

pub struct JournalStore {
    path: PathBuf,
    index: MemoryStore,
    writer: Mutex<JournalWriter>,
    replay: ReplaySummary,
}

impl JournalStore {
    /// Open or create the journal at `path` and replay its records
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let index = MemoryStore::new();
        let mut replay = ReplaySummary::default();
        let mut torn = false;

        if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            torn = !data.is_empty() && !data.ends_with('\n');
            for (lineno, line) in data.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<ClassificationRecord>(line) {
                    Ok(record) => match index.insert_if_absent(record)? {
                        InsertOutcome::Inserted => replay.loaded += 1,
                        InsertOutcome::Conflict => replay.duplicates += 1,
                    },
                    Err(e) => {
                        warn!("Skipping journal line {} of {}: {}", lineno + 1, path.display(), e);
                        replay.skipped += 1;
                    }
                }
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        info!(
            "Opened journal {} ({} records, {} duplicates, {} skipped)",
            path.display(),
            replay.loaded,
            replay.duplicates,
            replay.skipped
        );

        Ok(Self {
            path,
            index,
            writer: Mutex::new(JournalWriter { file, torn }),
            replay,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What was found when the journal was opened
    pub fn replay_summary(&self) -> ReplaySummary {
        self.replay
    }

    /// Write one record line.
    ///
    /// A failed write is truncated back to where it started; if even that
    /// fails the writer is marked torn and the next line starts with a newline.
    fn append(
        &self,
        writer: &mut JournalWriter,
        record: &ClassificationRecord,
    ) -> Result<(), StoreError> {
        let mut line = String::new();
        if writer.torn {
            line.push('\n');
        }
        line.push_str(&serde_json::to_string(record)?);
        line.push('\n');

        let start = writer.file.metadata()?.len();
        let file = &mut writer.file;
        if let Err(e) = file.write_all(line.as_bytes()).and_then(|_| file.flush()) {
            if let Err(undo) = file.set_len(start) {
                warn!("Failed to truncate torn line in {}: {}", self.path.display(), undo);
                writer.torn = true;
            }
            return Err(e.into());
        }
        writer.torn = false;
        Ok(())
    }
}

impl ClassificationStore for JournalStore {
    fn find(&self, fingerprint: &Fingerprint) -> Result<Option<ClassificationRecord>, StoreError> {
        self.index.find(fingerprint)
    }

    fn insert_if_absent(&self, record: ClassificationRecord) -> Result<InsertOutcome, StoreError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::Unavailable("journal writer lock poisoned".into()))?;
        if self.index.find(&record.fingerprint)?.is_some() {
            return Ok(InsertOutcome::Conflict);
        }
        self.append(&mut writer, &record)?;
        self.index.insert_if_absent(record)
    }

    fn count_by_verdict(&self, mutant: bool) -> Result<u64, StoreError> {
        self.index.count_by_verdict(mutant)
    }

    fn len(&self) -> Result<u64, StoreError> {
        self.index.len()
    }
}

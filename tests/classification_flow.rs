use mutant_core::{
    ClassificationStore, Classifier, JournalStore, Outcome, ServiceConfig, StoreConfig,
    ValidationError,
};
use std::sync::Arc;
use tempfile::TempDir;

const MUTANT: [&str; 4] = ["AAAA", "TCTT", "GCGC", "CCCC"];
const HUMAN: [&str; 6] = ["ATGCGA", "CAGTGC", "TTATGT", "AGACGG", "GCGTCA", "TCACTG"];

fn rows(rows: &[&str]) -> Vec<Option<String>> {
    rows.iter().map(|r| Some(r.to_string())).collect()
}

// ── Verdicts survive a restart through the journal ───────────────────────

#[test]
fn journal_verdicts_survive_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.jsonl");

    {
        let classifier = Classifier::new(Arc::new(JournalStore::open(&path).unwrap())).unwrap();
        assert_eq!(classifier.analyze(&rows(&MUTANT)).unwrap(), Outcome::Mutant);
        assert_eq!(classifier.analyze(&rows(&HUMAN)).unwrap(), Outcome::NonMutant);
    }

    let store = Arc::new(JournalStore::open(&path).unwrap());
    let classifier = Classifier::new(store.clone()).unwrap();
    assert_eq!(classifier.analyze(&rows(&MUTANT)).unwrap(), Outcome::Mutant);
    assert_eq!(store.len().unwrap(), 2);

    let stats = classifier.stats().unwrap();
    assert_eq!(stats.count_mutant_dna, 1);
    assert_eq!(stats.count_human_dna, 1);
    assert_eq!(stats.ratio, 1.0);
}

// ── Statistics follow distinct grids, not requests ───────────────────────

#[test]
fn stats_count_distinct_grids_only() {
    let config = ServiceConfig { store: StoreConfig::Memory, ..ServiceConfig::default() };
    let classifier = Classifier::new(config.open_store().unwrap()).unwrap();

    for _ in 0..3 {
        classifier.analyze(&rows(&MUTANT)).unwrap();
        classifier.analyze(&rows(&["aaaa", "tctt", "gcgc", "cccc"])).unwrap();
    }
    classifier.analyze(&rows(&["AGCT", "AGTC", "AGCT", "AGTC"])).unwrap();
    classifier.analyze(&rows(&HUMAN)).unwrap();
    classifier.analyze(&rows(&["AAAA", "TCTT"])).unwrap();

    let stats = classifier.stats().unwrap();
    assert_eq!(stats.count_mutant_dna, 2);
    assert_eq!(stats.count_human_dna, 1);
    assert_eq!(stats.ratio, 2.0);
}

#[test]
fn invalid_input_never_reaches_the_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.jsonl");
    let classifier = Classifier::new(Arc::new(JournalStore::open(&path).unwrap())).unwrap();

    let mut with_null = rows(&MUTANT);
    with_null[0] = None;
    let outcome = classifier.analyze(&with_null).unwrap();
    assert_eq!(outcome, Outcome::Invalid(ValidationError::MissingRow { row: 0 }));

    let empty: Vec<Option<String>> = Vec::new();
    assert_eq!(classifier.analyze(&empty).unwrap(), Outcome::Invalid(ValidationError::Empty));

    assert!(classifier.store().is_empty().unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
}

// ── Concurrent callers on a durable store ────────────────────────────────

#[test]
fn concurrent_callers_write_one_journal_line_per_grid() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.jsonl");
    let classifier = Classifier::new(Arc::new(JournalStore::open(&path).unwrap())).unwrap();

    std::thread::scope(|s| {
        for i in 0..16 {
            let classifier = &classifier;
            s.spawn(move || {
                let grid: &[&str] = if i % 2 == 0 { &MUTANT } else { &HUMAN };
                classifier.analyze(&rows(grid)).unwrap()
            });
        }
    });

    let journal = std::fs::read_to_string(&path).unwrap();
    assert_eq!(journal.lines().count(), 2);
    let stats = classifier.stats().unwrap();
    assert_eq!((stats.count_mutant_dna, stats.count_human_dna), (1, 1));
}

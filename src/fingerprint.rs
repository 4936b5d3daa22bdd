//! Fingerprint: content address of a grid
//!
//! SHA256 over the canonical row concatenation, hex encoded. The digest is
//! stable across restarts, so journaled verdicts stay valid.

use crate::dna::Grid;
use crate::error::MutantError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA256("abc")
const SELF_TEST_INPUT: &[u8] = b"abc";
const SELF_TEST_DIGEST: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

/// Hex-encoded SHA256 digest of a grid's canonical content
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes fingerprints. Construct once at startup.
#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter(());

impl Fingerprinter {
    /// Verify the digest primitive against a known answer.
    ///
    /// Failure means the process cannot classify anything and should stop.
    pub fn new() -> Result<Self, MutantError> {
        let digest = hex::encode(Sha256::digest(SELF_TEST_INPUT));
        if digest != SELF_TEST_DIGEST {
            return Err(MutantError::DigestUnavailable(format!(
                "SHA256 self test failed: got {}",
                digest
            )));
        }
        Ok(Self(()))
    }

    pub fn fingerprint(&self, grid: &Grid) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(grid.canonical().as_bytes());
        Fingerprint(hex::encode(hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_test_passes() {
        assert!(Fingerprinter::new().is_ok());
    }

    #[test]
    fn test_fingerprint_is_hex_sha256_of_rows() {
        let fp = Fingerprinter::new().unwrap();
        let grid = Grid::parse(&["AAAA", "TCTT", "GCGC", "CCCC"]).unwrap();
        let expected = hex::encode(Sha256::digest(b"AAAATCTTGCGCCCCC"));
        assert_eq!(fp.fingerprint(&grid).as_str(), expected);
        assert_eq!(fp.fingerprint(&grid).as_str().len(), 64);
    }

    #[test]
    fn test_case_insensitive() {
        let fp = Fingerprinter::new().unwrap();
        let upper = Grid::parse(&["AAAA", "TCTT", "GCGC", "CCCC"]).unwrap();
        let mixed = Grid::parse(&["aaaa", "TcTt", "gcgc", "CCCC"]).unwrap();
        assert_eq!(fp.fingerprint(&upper), fp.fingerprint(&mixed));
    }

    #[test]
    fn test_different_grids_differ() {
        let fp = Fingerprinter::new().unwrap();
        let a = Grid::parse(&["AAAA", "TCTT", "GCGC", "CCCC"]).unwrap();
        let b = Grid::parse(&["AAAA", "TCTT", "GCGC", "CCCA"]).unwrap();
        assert_ne!(fp.fingerprint(&a), fp.fingerprint(&b));
        assert_eq!(fp.fingerprint(&a).short().len(), 12);
    }
}

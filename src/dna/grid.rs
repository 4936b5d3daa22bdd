//! Grid: a validated, normalized NxN matrix of bases

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four DNA bases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Base {
    A,
    T,
    C,
    G,
}

impl Base {
    pub const ALL: [Base; 4] = [Base::A, Base::T, Base::C, Base::G];

    /// Parse a symbol, case-insensitively
    pub fn from_char(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'A' => Some(Base::A),
            'T' => Some(Base::T),
            'C' => Some(Base::C),
            'G' => Some(Base::G),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::T => 'T',
            Base::C => 'C',
            Base::G => 'G',
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A square grid of bases, stored row-major.
///
/// Instances are only produced by [`crate::dna::validate`] (or generated
/// in-crate), so every `Grid` is square, at least 4x4 and uppercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Base>,
}

impl Grid {
    pub(crate) fn from_cells(size: usize, cells: Vec<Base>) -> Self {
        debug_assert_eq!(cells.len(), size * size);
        Self { size, cells }
    }

    /// Generate a uniformly random grid of the given size
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let size = size.max(super::MIN_SIZE);
        let cells = (0..size * size)
            .map(|_| Base::ALL[rng.gen_range(0..Base::ALL.len())])
            .collect();
        Self { size, cells }
    }

    /// Side length N
    pub fn size(&self) -> usize {
        self.size
    }

    /// Base at (row, col). Panics when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Base {
        self.cells[row * self.size + col]
    }

    /// Rows as uppercase strings
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.size)
            .map(|row| row.iter().map(|b| b.as_char()).collect())
            .collect()
    }

    /// Rows joined in order with no delimiter; the input to the fingerprint
    pub fn canonical(&self) -> String {
        self.cells.iter().map(|b| b.as_char()).collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", row)?;
        }
        Ok(())
    }
}

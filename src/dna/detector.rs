//! Sequence detector: counts runs of four identical bases
//!
//! Every cell is tested as the start of a run in four directions. Overlapping
//! runs starting at different cells are counted separately, so a single line
//! of six identical bases already yields three runs.

use super::grid::{Base, Grid};
use serde::{Deserialize, Serialize};

/// Length of a run
pub const RUN_LENGTH: usize = 4;
/// Runs needed for a mutant verdict
pub const MUTANT_THRESHOLD: usize = 2;

/// Direction a run extends in from its starting cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Rightward along the row
    Horizontal,
    /// Downward along the column
    Vertical,
    /// Down and to the right
    DiagonalDown,
    /// Up and to the right
    DiagonalUp,
}

impl Direction {
    /// Order in which directions are tested at each cell
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::DiagonalDown,
        Direction::DiagonalUp,
    ];

    /// (row delta, column delta)
    fn delta(self) -> (isize, isize) {
        match self {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
            Direction::DiagonalDown => (1, 1),
            Direction::DiagonalUp => (-1, 1),
        }
    }

    /// Whether a run starting at (row, col) stays inside an n x n grid
    fn fits(self, row: usize, col: usize, n: usize) -> bool {
        let reach = RUN_LENGTH - 1;
        let cols_fit = col + reach < n;
        let rows_down_fit = row + reach < n;
        match self {
            Direction::Horizontal => cols_fit,
            Direction::Vertical => rows_down_fit,
            Direction::DiagonalDown => rows_down_fit && cols_fit,
            Direction::DiagonalUp => row >= reach && cols_fit,
        }
    }
}

/// A run of identical bases found during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub base: Base,
}

/// Scan the grid row by row and collect runs in detection order.
///
/// With `limit = Some(k)` the scan stops as soon as `k` runs are found.
pub fn scan(grid: &Grid, limit: Option<usize>) -> Vec<Run> {
    let n = grid.size();
    let mut runs = Vec::new();
    if limit == Some(0) {
        return runs;
    }
    for row in 0..n {
        for col in 0..n {
            for direction in Direction::ALL {
                if !direction.fits(row, col, n) || !is_run(grid, row, col, direction) {
                    continue;
                }
                runs.push(Run { row, col, direction, base: grid.get(row, col) });
                if limit.is_some_and(|k| runs.len() >= k) {
                    return runs;
                }
            }
        }
    }
    runs
}

/// Mutant when at least two runs exist; stops scanning at the second
pub fn is_mutant(grid: &Grid) -> bool {
    scan(grid, Some(MUTANT_THRESHOLD)).len() >= MUTANT_THRESHOLD
}

fn is_run(grid: &Grid, row: usize, col: usize, direction: Direction) -> bool {
    let (dr, dc) = direction.delta();
    let base = grid.get(row, col);
    (1..RUN_LENGTH as isize).all(|step| {
        let r = (row as isize + dr * step) as usize;
        let c = (col as isize + dc * step) as usize;
        grid.get(r, c) == base
    })
}

/// Anything that can turn a grid into a verdict.
///
/// The classifier is generic over this so the verdict source can be swapped
/// or instrumented.
pub trait Detector: Send + Sync {
    fn is_mutant(&self, grid: &Grid) -> bool;
}

/// The run-counting detector
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceDetector;

impl Detector for SequenceDetector {
    fn is_mutant(&self, grid: &Grid) -> bool {
        is_mutant(grid)
    }
}

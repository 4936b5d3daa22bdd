//! Validator: turns raw rows into a `Grid` or rejects them
//!
//! Pure precondition check: nothing is hashed, detected or stored for a
//! rejected input.

use super::grid::{Base, Grid};
use log::warn;

/// Smallest accepted side length
pub const MIN_SIZE: usize = 4;

/// Reasons a raw grid is rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("DNA is missing")]
    Missing,

    #[error("DNA is empty")]
    Empty,

    #[error("DNA has {rows} rows, at least 4 are required")]
    TooSmall { rows: usize },

    #[error("row {row} is missing")]
    MissingRow { row: usize },

    #[error("row {row} has length {len}, expected {expected} (grid must be NxN)")]
    NotSquare { row: usize, len: usize, expected: usize },

    #[error("row {row} column {col} holds '{symbol}', only A, T, C, G are allowed")]
    InvalidBase { row: usize, col: usize, symbol: char },
}

/// Validate raw rows, normalizing bases to uppercase.
///
/// `None` rows stand for absent entries in the inbound request.
pub fn validate<S: AsRef<str>>(rows: &[Option<S>]) -> Result<Grid, ValidationError> {
    let result = check(rows);
    if let Err(e) = &result {
        warn!("Rejected DNA: {}", e);
    }
    result
}

fn check<S: AsRef<str>>(rows: &[Option<S>]) -> Result<Grid, ValidationError> {
    if rows.is_empty() {
        return Err(ValidationError::Empty);
    }
    let n = rows.len();
    if n < MIN_SIZE {
        return Err(ValidationError::TooSmall { rows: n });
    }

    let mut cells = Vec::with_capacity(n * n);
    for (r, row) in rows.iter().enumerate() {
        let row: &str = match row {
            Some(row) => row.as_ref(),
            None => return Err(ValidationError::MissingRow { row: r }),
        };
        let len = row.chars().count();
        if len != n {
            return Err(ValidationError::NotSquare { row: r, len, expected: n });
        }
        for (c, symbol) in row.chars().enumerate() {
            let base = Base::from_char(symbol)
                .ok_or(ValidationError::InvalidBase { row: r, col: c, symbol })?;
            cells.push(base);
        }
    }
    Ok(Grid::from_cells(n, cells))
}

impl Grid {
    /// Validate rows that are all present
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Grid, ValidationError> {
        let rows: Vec<Option<&str>> = rows.iter().map(|r| Some(r.as_ref())).collect();
        validate(&rows)
    }
}

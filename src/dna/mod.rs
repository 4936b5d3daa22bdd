//! DNA grids: validation and mutant sequence detection
//!
//! A grid is an NxN matrix of bases (A, T, C, G). Raw rows go through the
//! validator, which is the only way to obtain a `Grid`; the detector then
//! scans it for runs of four identical bases.

mod grid;
mod validator;
mod detector;

pub use grid::{Base, Grid};
pub use validator::{validate, ValidationError, MIN_SIZE};
pub use detector::{
    is_mutant, scan, Detector, Direction, Run, SequenceDetector, MUTANT_THRESHOLD, RUN_LENGTH,
};

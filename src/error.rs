// SPDX-License-Identifier: Apache-2.0

//! Error kinds surfaced by the catalog core.
//!
//! All operations report failures through [`Error`]; the core performs no
//! retries. Callers decide which kinds are terminal -- `Unsat` from the
//! synthesizer is commonly answered by drawing a fresh forward circuit,
//! `DuplicateFingerprint` is idempotent from the catalog's point of view.

use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Gate out of bounds, repeated wire in `target + controls`, width
    /// mismatch, or a malformed gates blob.
    InvalidCircuit(String),
    /// Adjacent swap requested at a position where the gates do not commute.
    NonCommuting { index: usize },
    /// Width or gate budget beyond the encoder's supported range.
    EncodingLimit(String),
    /// The synthesis query provably has no solution for the given budget.
    Unsat,
    /// The backend solver returned a malformed model, no model, or failed to
    /// run at all.
    SolverFailure(String),
    /// A cooperative cancellation token fired.
    Cancelled,
    /// Strict insert attempted for a fingerprint already present.
    DuplicateFingerprint,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidCircuit(msg) => write!(f, "invalid circuit: {}", msg),
            Error::NonCommuting { index } => {
                write!(f, "gates at positions {} and {} do not commute", index, index + 1)
            }
            Error::EncodingLimit(msg) => write!(f, "encoding limit exceeded: {}", msg),
            Error::Unsat => write!(f, "no circuit exists within the given gate budget"),
            Error::SolverFailure(msg) => write!(f, "solver failure: {}", msg),
            Error::Cancelled => write!(f, "operation cancelled"),
            Error::DuplicateFingerprint => write!(f, "circuit fingerprint already present"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

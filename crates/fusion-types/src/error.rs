// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Error
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    /// The grid or coefficients cannot support the requested solver.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Singular tridiagonal system for mode kz={mode}: {reason}")]
    SingularSystem { mode: usize, reason: String },

    #[error("Non-finite value {value} at ({x}, {y}, {z})")]
    NonFinite {
        x: usize,
        y: usize,
        z: usize,
        value: f64,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Field index ({x}, {y}, {z}) out of bounds ({nx}, {ny}, {nz})")]
    IndexOutOfBounds {
        x: usize,
        y: usize,
        z: usize,
        nx: usize,
        ny: usize,
        nz: usize,
    },

    #[error("Field access on unallocated data")]
    Unallocated,

    /// A tridiagonal elimination met a vanishing pivot.
    #[error("Zero pivot at row {row} (|pivot| = {magnitude:.3e})")]
    SingularPivot { row: usize, magnitude: f64 },

    #[error("Linear algebra error: {0}")]
    LinAlg(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FusionResult<T> = Result<T, FusionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_message_names_indices() {
        let err = FusionError::NonFinite {
            x: 3,
            y: 1,
            z: 7,
            value: f64::NAN,
        };
        let msg = err.to_string();
        assert!(msg.contains("(3, 1, 7)"), "unexpected message: {msg}");
    }

    #[test]
    fn test_singular_pivot_message_names_row() {
        let err = FusionError::SingularPivot {
            row: 4,
            magnitude: 0.0,
        };
        assert!(err.to_string().contains("row 4"), "unexpected message: {err}");
    }

    #[test]
    fn test_json_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: FusionError = parse.unwrap_err().into();
        assert!(matches!(err, FusionError::Json(_)));
    }
}

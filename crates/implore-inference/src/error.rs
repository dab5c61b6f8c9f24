//! Error types for implore-inference
//!
//! Internal numeric helpers signal failure with NaN. Public entry points
//! translate invalid input and degenerate data into these variants so that
//! a batch caller can report one failed variable and keep going.

use thiserror::Error;

/// Main error type for inference operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Fewer finite observations than the test requires
    #[error("{test} requires at least {required} observations, got {got}")]
    InsufficientData {
        test: &'static str,
        required: usize,
        got: usize,
    },

    /// A group contained no finite observations
    #[error("Group '{group}' has no valid observations")]
    EmptyGroup { group: String },

    /// Not enough groups for a k-sample test
    #[error("At least {required} groups are required, got {got}")]
    TooFewGroups { required: usize, got: usize },

    /// Sample exceeds the range a test's approximation is valid for
    #[error("{test} supports at most {max} observations, got {got}")]
    SampleTooLarge {
        test: &'static str,
        max: usize,
        got: usize,
    },

    /// Zero variance, zero range or another numerically degenerate input
    #[error("Degenerate data: {message}")]
    DegenerateData { message: String },

    /// Malformed contingency table
    #[error("Invalid contingency table: {message}")]
    InvalidTable { message: String },

    /// Unrecognised pairwise comparison method tag
    #[error("Unknown pairwise method: {method}")]
    UnknownMethod { method: String },

    /// Paired inputs of different length
    #[error("Length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Sorted order violated while accumulating Shapiro-Wilk sums
    #[error("Data are not in ascending order")]
    UnsortedInput,

    /// A statistic or p-value came out non-finite, usually because a
    /// continued fraction or series hit its iteration cap
    #[error("Numerical failure in {routine}")]
    NonFinite { routine: &'static str },
}

/// Result type alias for inference operations
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Validation utilities shared by the public entry points
pub mod validation {
    use super::*;

    /// Require at least `required` observations
    pub fn require_len(
        test: &'static str,
        got: usize,
        required: usize,
    ) -> InferenceResult<()> {
        if got < required {
            return Err(InferenceError::InsufficientData {
                test,
                required,
                got,
            });
        }
        Ok(())
    }

    /// Require at least `required` groups
    pub fn require_groups(got: usize, required: usize) -> InferenceResult<()> {
        if got < required {
            return Err(InferenceError::TooFewGroups { required, got });
        }
        Ok(())
    }

    /// Require two paired inputs of equal length
    pub fn require_same_len(left: usize, right: usize) -> InferenceResult<()> {
        if left != right {
            return Err(InferenceError::LengthMismatch { left, right });
        }
        Ok(())
    }

    /// Turn a NaN/infinite statistic into an explicit error
    pub fn require_finite(routine: &'static str, value: f64) -> InferenceResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(InferenceError::NonFinite { routine })
        }
    }

    /// Check that a contingency table is rectangular, non-empty and has
    /// no empty margins
    pub fn validate_table(table: &[Vec<u64>]) -> InferenceResult<()> {
        let cols = match table.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => {
                return Err(InferenceError::InvalidTable {
                    message: "table has no cells".to_string(),
                })
            }
        };
        if table.iter().any(|row| row.len() != cols) {
            return Err(InferenceError::InvalidTable {
                message: "rows have different lengths".to_string(),
            });
        }
        if table.iter().flatten().all(|&c| c == 0) {
            return Err(InferenceError::InvalidTable {
                message: "table total is zero".to_string(),
            });
        }
        Ok(())
    }
}

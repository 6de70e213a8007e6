//! Error type shared by the geometry primitives, the random walks and the chain driver.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum WalkError {
    /// A scalar parameter was outside of its admissible range.
    #[error("invalid value for `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Two arrays (or an array and a body) disagree on their dimensions.
    #[error("{what} has incompatible dimensions: expected {expected}, got {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// An intersection query returned an empty or degenerate chord. Either the query
    /// point is not interior to the body, or the body itself is malformed.
    #[error("lower extreme must be smaller than upper extreme, but got {lower} >= {upper}")]
    InvalidChord { lower: f64, upper: f64 },

    /// A boundary reflection was requested along a ray that never leaves the body.
    #[error("ray does not hit the boundary of the convex body")]
    NoBoundaryHit,

    /// The convex body does not implement the requested geometric query.
    #[error("convex body does not support `{0}`")]
    UnsupportedCapability(&'static str),

    /// Billiard walk gave up after the configured number of failed trajectories.
    #[error("billiard walk gave up after {attempts} trajectories hit the reflection limit")]
    RetriesExhausted { attempts: usize },

    /// A diagnostic could not be computed from the given samples.
    #[error("cannot compute {statistic}: {reason}")]
    Diagnostic {
        statistic: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, WalkError>;

/// Shorthand for the strictly-positive check used by every constructor.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(WalkError::InvalidParameter {
            name,
            reason: format!("must be a positive number, but got {value}"),
        })
    }
}

pub(crate) fn ensure_nonzero(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        Err(WalkError::InvalidParameter {
            name,
            reason: "must be a positive integer, but got 0".to_string(),
        })
    } else {
        Ok(())
    }
}

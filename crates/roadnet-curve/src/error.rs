//! Error types for curve construction and editing.

use thiserror::Error;

/// Errors that can occur when building or editing a curve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// A curve needs two control points to have any extent.
    #[error("curve needs at least 2 control points, got {0}")]
    TooFewPoints(usize),

    /// Control point index past the end of the curve.
    #[error("control point {index} out of range for a curve with {len} points")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of control points.
        len: usize,
    },

    /// A control point has a NaN or infinite coordinate.
    #[error("control point {0} is not finite")]
    NonFinite(usize),
}

/// Result type for curve operations.
pub type Result<T> = std::result::Result<T, CurveError>;

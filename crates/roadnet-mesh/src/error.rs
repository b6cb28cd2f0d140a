//! Error types for mesh generation.

use thiserror::Error;

/// Errors reported by mesh settings validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Invalid mesh settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;

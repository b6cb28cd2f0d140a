//! Error types for the road network.

use roadnet_curve::CurveError;
use roadnet_mesh::MeshError;
use thiserror::Error;

use crate::CurveId;

/// Errors that can occur while editing or configuring a network.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// No curve with this id is stored in the network.
    #[error("unknown curve {0:?}")]
    UnknownCurve(CurveId),

    /// A curve edit was rejected.
    #[error("curve edit failed: {0}")]
    Curve(#[from] CurveError),

    /// Mesh settings were rejected.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Invalid network settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings file could not be parsed.
    #[error("failed to parse settings: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;

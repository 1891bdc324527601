//! Error types
//!
//! Every fallible operation in the engine returns [`RigError`]. Geometry
//! merging has its own [`AggregationError`] so callers can tell "nothing to
//! merge" apart from "buffers could not be unified".

use thiserror::Error;

/// Failures while merging scene meshes into one collision buffer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AggregationError {
    /// Every candidate mesh was filtered out (player mesh, missing positions).
    #[error("no static meshes left to merge")]
    NoMeshes,
    /// The attribute buffers of the remaining meshes could not be combined.
    #[error("could not merge geometry: {0}")]
    MergeFailed(String),
}

/// Top-level error for the character rig.
#[derive(Debug, Error)]
pub enum RigError {
    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    /// The asset loader could not resolve a URL.
    #[error("failed to load asset '{url}': {reason}")]
    AssetLoad { url: String, reason: String },

    /// The character asset lacks one of the required animation clips.
    #[error("character has no clip named '{0}'")]
    MissingClip(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RigError {
    /// Convenience constructor for loader implementations.
    pub fn asset_load(url: impl Into<String>, reason: impl Into<String>) -> Self {
        RigError::AssetLoad {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_error_converts() {
        let err: RigError = AggregationError::NoMeshes.into();
        assert!(matches!(err, RigError::Aggregation(AggregationError::NoMeshes)));
        assert_eq!(err.to_string(), "no static meshes left to merge");
    }

    #[test]
    fn test_asset_load_message() {
        let err = RigError::asset_load("models/hero.glb", "not found");
        assert_eq!(
            err.to_string(),
            "failed to load asset 'models/hero.glb': not found"
        );
    }
}

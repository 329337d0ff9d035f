//! # World Error Types
//!
//! Errors raised while building regions, loading zone maps and spawning.

use realm_core::CoreError;
use thiserror::Error;

/// Errors that can occur in the world layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    /// The far corner lies before the origin on at least one axis.
    #[error("inverted region: far corner ({far_x}, {far_z}) is before origin ({x}, {z})")]
    InvertedRegion {
        /// Origin x.
        x: f32,
        /// Origin z.
        z: f32,
        /// Far corner x.
        far_x: f32,
        /// Far corner z.
        far_z: f32,
    },

    /// Region extents are not finite, or overflow when computed.
    #[error("region extents are not finite")]
    NonFiniteRegion,

    /// Circle radius is negative or not finite.
    #[error("invalid circle radius: {0}")]
    InvalidRadius(f32),

    /// Polygon has fewer than three vertices or zero area.
    #[error("degenerate polygon with {vertices} vertices")]
    DegeneratePolygon {
        /// Number of vertices supplied.
        vertices: usize,
    },

    /// Two zones share a name.
    #[error("duplicate zone: {0}")]
    DuplicateZone(String),

    /// No zone with this name.
    #[error("unknown zone: {0}")]
    UnknownZone(String),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Entity operation failed while spawning.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;

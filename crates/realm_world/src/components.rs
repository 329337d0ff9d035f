//! Stock components attached by the world layer.

use realm_core::Component;
use realm_shared::Vec3;

/// World position of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position(pub Vec3);

impl Position {
    /// Creates a position.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    /// The point.
    #[inline]
    #[must_use]
    pub const fn point(&self) -> Vec3 {
        self.0
    }
}

impl From<Vec3> for Position {
    fn from(point: Vec3) -> Self {
        Self(point)
    }
}

impl Component for Position {}

/// Zone an entity was spawned in; used for respawn and leash checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnOrigin {
    zone: String,
}

impl SpawnOrigin {
    /// Creates an origin marker for `zone`.
    #[must_use]
    pub fn new(zone: impl Into<String>) -> Self {
        Self { zone: zone.into() }
    }

    /// Name of the zone.
    #[inline]
    #[must_use]
    pub fn zone(&self) -> &str {
        &self.zone
    }
}

impl Component for SpawnOrigin {}

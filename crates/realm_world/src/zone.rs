//! # Zones
//!
//! Named regions loaded from map configuration.
//!
//! ```toml
//! [[zone]]
//! name = "flaris-wolves"
//! kind = "respawn"
//! shape = "rectangle"
//! x = 100.0
//! z = 200.0
//! far_x = 180.0
//! far_z = 260.0
//! spawn = { kind = "monster", count = 12 }
//!
//! [[zone]]
//! name = "flaris-town"
//! kind = "town"
//! shape = "polygon"
//! points = [[0.0, 0.0], [60.0, 0.0], [60.0, 40.0], [0.0, 40.0]]
//! ```
//!
//! Rectangles are given by their far corner (`far_x`, `far_z`), never by a
//! width. Zones keep file order; lookups by name go through an index.

use std::collections::HashMap;

use realm_core::{Entity, EntityKind};
use realm_shared::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::Position;
use crate::error::{WorldError, WorldResult};
use crate::region::Region;

/// What a zone is used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// Monsters and NPCs are spawned here.
    Respawn,
    /// Players revive here.
    Revival,
    /// Safe area.
    Town,
    /// Gameplay trigger (quests, teleports).
    Trigger,
}

/// How many entities of which kind a zone spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRule {
    /// Kind given to spawned entities.
    pub kind: EntityKind,
    /// Number of entities.
    pub count: u32,
}

/// A named region with a purpose.
#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    name: String,
    kind: ZoneKind,
    region: Region,
    spawn: Option<SpawnRule>,
}

impl Zone {
    /// Creates a zone without a spawn rule.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ZoneKind, region: Region) -> Self {
        Self {
            name: name.into(),
            kind,
            region,
            spawn: None,
        }
    }

    /// Sets the spawn rule.
    #[must_use]
    pub fn with_spawn(mut self, rule: SpawnRule) -> Self {
        self.spawn = Some(rule);
        self
    }

    /// Zone name, unique within a [`ZoneMap`].
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zone kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ZoneKind {
        self.kind
    }

    /// Zone shape.
    #[inline]
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }

    /// Spawn rule, if any.
    #[inline]
    #[must_use]
    pub const fn spawn(&self) -> Option<SpawnRule> {
        self.spawn
    }

    /// Ground-plane containment.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        self.region.contains(point)
    }
}

/// Zones entered and left by a move.
#[derive(Debug, Default, PartialEq)]
pub struct ZoneTransition<'a> {
    /// Zones containing the destination but not the origin.
    pub entered: Vec<&'a Zone>,
    /// Zones containing the origin but not the destination.
    pub left: Vec<&'a Zone>,
}

impl ZoneTransition<'_> {
    /// Returns `true` if the move crossed no zone boundary.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.left.is_empty()
    }
}

/// All zones of one map.
#[derive(Debug, Default)]
pub struct ZoneMap {
    zones: Vec<Zone>,
    by_name: HashMap<String, usize>,
}

impl ZoneMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a TOML zone file.
    ///
    /// # Errors
    ///
    /// - [`WorldError::InvalidConfig`] if the text is not a valid zone file
    /// - Any geometry error from building a zone's region
    /// - [`WorldError::DuplicateZone`] if two zones share a name
    pub fn from_toml_str(text: &str) -> WorldResult<Self> {
        let config: ZoneMapConfig =
            toml::from_str(text).map_err(|e| WorldError::InvalidConfig(e.to_string()))?;
        Self::from_config(config)
    }

    /// Builds a map from parsed configuration.
    ///
    /// # Errors
    ///
    /// Geometry errors, or [`WorldError::DuplicateZone`].
    pub fn from_config(config: ZoneMapConfig) -> WorldResult<Self> {
        let mut map = Self::new();
        for zone in config.zones {
            map.insert(Zone::try_from(zone)?)?;
        }
        tracing::debug!(zones = map.len(), "zone map loaded");
        Ok(map)
    }

    /// Adds a zone.
    ///
    /// # Errors
    ///
    /// [`WorldError::DuplicateZone`] if a zone with the same name exists.
    pub fn insert(&mut self, zone: Zone) -> WorldResult<()> {
        if self.by_name.contains_key(zone.name()) {
            return Err(WorldError::DuplicateZone(zone.name));
        }
        self.by_name.insert(zone.name.clone(), self.zones.len());
        self.zones.push(zone);
        Ok(())
    }

    /// Number of zones.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Returns `true` if the map has no zones.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zone by name, or `None`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Zone> {
        self.by_name.get(name).map(|&index| &self.zones[index])
    }

    /// Zone by name.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownZone`] if no zone has this name.
    pub fn zone(&self, name: &str) -> WorldResult<&Zone> {
        self.get(name)
            .ok_or_else(|| WorldError::UnknownZone(name.to_owned()))
    }

    /// All zones in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, Zone> {
        self.zones.iter()
    }

    /// Zones of one kind, in file order.
    pub fn of_kind(&self, kind: ZoneKind) -> impl Iterator<Item = &Zone> + '_ {
        self.zones.iter().filter(move |zone| zone.kind == kind)
    }

    /// Zones containing `point`, in file order.
    pub fn zones_at(&self, point: Vec3) -> impl Iterator<Item = &Zone> + '_ {
        self.zones.iter().filter(move |zone| zone.contains(point))
    }

    /// Zones containing the entity's [`Position`]; empty if it has none.
    #[must_use]
    pub fn zones_of(&self, entity: &Entity) -> Vec<&Zone> {
        entity
            .get::<Position>()
            .map(|position| self.zones_at(position.point()).collect())
            .unwrap_or_default()
    }

    /// Zones entered and left when moving from `from` to `to`.
    #[must_use]
    pub fn transition(&self, from: Vec3, to: Vec3) -> ZoneTransition<'_> {
        let mut transition = ZoneTransition::default();
        for zone in &self.zones {
            match (zone.contains(from), zone.contains(to)) {
                (false, true) => transition.entered.push(zone),
                (true, false) => transition.left.push(zone),
                _ => {}
            }
        }
        transition
    }
}

impl<'a> IntoIterator for &'a ZoneMap {
    type Item = &'a Zone;
    type IntoIter = std::slice::Iter<'a, Zone>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Zone file: a list of `[[zone]]` tables.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ZoneMapConfig {
    /// Zone entries.
    #[serde(default, rename = "zone")]
    pub zones: Vec<ZoneConfig>,
}

/// One `[[zone]]` table.
#[derive(Clone, Debug, Deserialize)]
pub struct ZoneConfig {
    /// Unique name.
    pub name: String,
    /// Purpose.
    pub kind: ZoneKind,
    /// Shape, tagged by the `shape` key.
    #[serde(flatten)]
    pub shape: ShapeConfig,
    /// Optional spawn rule.
    #[serde(default)]
    pub spawn: Option<SpawnRule>,
}

/// Shape section of a zone table.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeConfig {
    /// Origin corner and far corner.
    Rectangle {
        /// Origin x.
        x: f32,
        /// Origin z.
        z: f32,
        /// Far corner x (absolute).
        far_x: f32,
        /// Far corner z (absolute).
        far_z: f32,
    },
    /// Center and radius.
    Circle {
        /// Center x.
        center_x: f32,
        /// Center z.
        center_z: f32,
        /// Radius.
        radius: f32,
    },
    /// Vertex list, `[x, z]` pairs.
    Polygon {
        /// Vertices in order.
        points: Vec<[f32; 2]>,
    },
}

impl ShapeConfig {
    /// Validates and builds the region.
    ///
    /// # Errors
    ///
    /// The geometry error of the underlying shape.
    pub fn build(&self) -> WorldResult<Region> {
        match self {
            Self::Rectangle { x, z, far_x, far_z } => Region::rectangle(*x, *z, *far_x, *far_z),
            Self::Circle {
                center_x,
                center_z,
                radius,
            } => Region::circle(*center_x, *center_z, *radius),
            Self::Polygon { points } => Region::polygon(points.iter().copied().map(Vec2::from)),
        }
    }
}

impl TryFrom<ZoneConfig> for Zone {
    type Error = WorldError;

    fn try_from(config: ZoneConfig) -> WorldResult<Self> {
        let region = config.shape.build()?;
        Ok(Self {
            name: config.name,
            kind: config.kind,
            region,
            spawn: config.spawn,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"
        [[zone]]
        name = "flaris-wolves"
        kind = "respawn"
        shape = "rectangle"
        x = 100.0
        z = 200.0
        far_x = 180.0
        far_z = 260.0
        spawn = { kind = "monster", count = 12 }

        [[zone]]
        name = "flaris-town"
        kind = "town"
        shape = "polygon"
        points = [[0.0, 0.0], [60.0, 0.0], [60.0, 40.0], [0.0, 40.0]]

        [[zone]]
        name = "flaris-fountain"
        kind = "revival"
        shape = "circle"
        center_x = 30.0
        center_z = 20.0
        radius = 5.0
    "#;

    #[test]
    fn test_load_zone_map() {
        let map = ZoneMap::from_toml_str(MAP).unwrap();
        assert_eq!(map.len(), 3);

        let wolves = map.zone("flaris-wolves").unwrap();
        assert_eq!(wolves.kind(), ZoneKind::Respawn);
        assert_eq!(
            wolves.spawn(),
            Some(SpawnRule {
                kind: EntityKind::Monster,
                count: 12
            })
        );
        let bounds = wolves.region().bounds();
        assert_eq!((bounds.width(), bounds.length()), (80.0, 60.0));

        assert_eq!(map.zone("flaris-town").unwrap().region().shape(), "polygon");
        assert_eq!(map.zone("flaris-fountain").unwrap().spawn(), None);

        let names: Vec<_> = map.iter().map(Zone::name).collect();
        assert_eq!(names, ["flaris-wolves", "flaris-town", "flaris-fountain"]);
    }

    #[test]
    fn test_unknown_zone() {
        let map = ZoneMap::from_toml_str(MAP).unwrap();
        assert!(map.get("darkon").is_none());
        assert_eq!(
            map.zone("darkon").unwrap_err(),
            WorldError::UnknownZone("darkon".into())
        );
    }

    #[test]
    fn test_duplicate_zone_rejected() {
        let text = r#"
            [[zone]]
            name = "a"
            kind = "town"
            shape = "circle"
            center_x = 0.0
            center_z = 0.0
            radius = 1.0

            [[zone]]
            name = "a"
            kind = "trigger"
            shape = "circle"
            center_x = 5.0
            center_z = 5.0
            radius = 1.0
        "#;
        assert_eq!(
            ZoneMap::from_toml_str(text).unwrap_err(),
            WorldError::DuplicateZone("a".into())
        );
    }

    #[test]
    fn test_invalid_config() {
        let bad_shape = r#"
            [[zone]]
            name = "a"
            kind = "town"
            shape = "hexagon"
        "#;
        assert!(matches!(
            ZoneMap::from_toml_str(bad_shape),
            Err(WorldError::InvalidConfig(_))
        ));

        let inverted = r#"
            [[zone]]
            name = "a"
            kind = "town"
            shape = "rectangle"
            x = 10.0
            z = 10.0
            far_x = 0.0
            far_z = 20.0
        "#;
        assert!(matches!(
            ZoneMap::from_toml_str(inverted),
            Err(WorldError::InvertedRegion { .. })
        ));
    }

    #[test]
    fn test_empty_file() {
        assert!(ZoneMap::from_toml_str("").unwrap().is_empty());
    }

    #[test]
    fn test_zones_at_and_of_kind() {
        let map = ZoneMap::from_toml_str(MAP).unwrap();

        let at_fountain: Vec<_> = map.zones_at(Vec3::ground(30.0, 20.0)).map(Zone::name).collect();
        assert_eq!(at_fountain, ["flaris-town", "flaris-fountain"]);
        assert_eq!(map.zones_at(Vec3::ground(500.0, 500.0)).count(), 0);

        assert_eq!(map.of_kind(ZoneKind::Respawn).count(), 1);
        assert_eq!(map.of_kind(ZoneKind::Trigger).count(), 0);
    }

    #[test]
    fn test_transition() {
        let map = ZoneMap::from_toml_str(MAP).unwrap();

        let walk_out = map.transition(Vec3::ground(30.0, 20.0), Vec3::ground(50.0, 20.0));
        let left: Vec<_> = walk_out.left.iter().map(|z| z.name()).collect();
        assert_eq!(left, ["flaris-fountain"]);
        assert!(walk_out.entered.is_empty());

        let into_wolves = map.transition(Vec3::ground(50.0, 20.0), Vec3::ground(120.0, 230.0));
        let entered: Vec<_> = into_wolves.entered.iter().map(|z| z.name()).collect();
        assert_eq!(entered, ["flaris-wolves"]);
        assert_eq!(into_wolves.left.len(), 1);

        assert!(map
            .transition(Vec3::ground(10.0, 10.0), Vec3::ground(11.0, 10.0))
            .is_empty());
    }

    #[test]
    fn test_manual_insert() {
        let mut map = ZoneMap::new();
        let region = Region::rectangle(0.0, 0.0, 10.0, 10.0).unwrap();
        map.insert(Zone::new("gate", ZoneKind::Trigger, region.clone()))
            .unwrap();
        assert!(map
            .insert(Zone::new("gate", ZoneKind::Town, region))
            .is_err());
        assert_eq!((&map).into_iter().count(), 1);
    }
}

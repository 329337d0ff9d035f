//! # Spawner
//!
//! Places non-player actors inside respawn zones.
//!
//! The spawner owns a seeded ChaCha generator, so the same seed and the same
//! zone map always produce the same placements. The generator sits behind a
//! mutex; spawning from several content threads is safe but serialized on
//! sampling only, never on entity creation.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use realm_core::{Context, Entity};
use realm_shared::Vec3;

use crate::components::{Position, SpawnOrigin};
use crate::error::WorldResult;
use crate::region::Region;
use crate::zone::{Zone, ZoneKind, ZoneMap};

/// Seeded placement of entities into zones.
///
/// # Example
///
/// ```rust,ignore
/// let zones = ZoneMap::from_toml_str(&std::fs::read_to_string("flaris.toml")?)?;
/// let spawner = Spawner::new(0x5eed);
/// let spawned = spawner.populate(&context, &zones)?;
/// ```
#[derive(Debug)]
pub struct Spawner {
    seed: u64,
    rng: Mutex<ChaCha8Rng>,
}

impl Spawner {
    /// Creates a spawner from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// The seed this spawner was created with.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws a spawn point inside `region`.
    #[must_use]
    pub fn place(&self, region: &Region) -> Vec3 {
        region.random_point_with(&mut *self.rng.lock())
    }

    /// Creates the entities of `zone`'s spawn rule in `context`.
    ///
    /// Each entity gets a [`Position`] inside the zone and a [`SpawnOrigin`]
    /// naming it. Zones without a rule spawn nothing.
    ///
    /// # Errors
    ///
    /// [`WorldError::Core`](crate::WorldError::Core) if a component cannot be
    /// attached. The entity that failed is destroyed; earlier ones stay.
    pub fn spawn_zone(&self, context: &Context, zone: &Zone) -> WorldResult<Vec<Arc<Entity>>> {
        let Some(rule) = zone.spawn() else {
            return Ok(Vec::new());
        };

        let mut spawned = Vec::with_capacity(rule.count as usize);
        for _ in 0..rule.count {
            let entity = context.create_entity(rule.kind);
            if let Err(err) = self.equip(&entity, zone) {
                context.destroy_entity(&entity)?;
                return Err(err);
            }
            spawned.push(entity);
        }

        tracing::debug!(
            zone = zone.name(),
            kind = ?rule.kind,
            count = spawned.len(),
            context = context.name(),
            "zone spawned"
        );
        Ok(spawned)
    }

    fn equip(&self, entity: &Entity, zone: &Zone) -> WorldResult<()> {
        entity.add(Position(self.place(zone.region())))?;
        entity.add(SpawnOrigin::new(zone.name()))?;
        Ok(())
    }

    /// Spawns every respawn zone of `zones` into `context`.
    ///
    /// # Returns
    ///
    /// Total number of entities created.
    ///
    /// # Errors
    ///
    /// The first error from [`spawn_zone`](Self::spawn_zone).
    pub fn populate(&self, context: &Context, zones: &ZoneMap) -> WorldResult<usize> {
        let mut total = 0;
        for zone in zones.of_kind(ZoneKind::Respawn) {
            total += self.spawn_zone(context, zone)?.len();
        }
        Ok(total)
    }

    /// Moves `entity` to a fresh point inside `zone`.
    ///
    /// Updates the existing [`Position`] in place, or attaches one.
    ///
    /// # Errors
    ///
    /// [`WorldError::Core`](crate::WorldError::Core) if the entity was disposed.
    pub fn relocate(&self, entity: &Entity, zone: &Zone) -> WorldResult<Vec3> {
        let point = self.place(zone.region());
        entity.upsert(Position(point), |position| position.0 = point)?;
        Ok(point)
    }
}

//! # Entity Context
//!
//! The owning container for the entities of one simulation universe
//! (one map or world instance). It allocates ids, creates and destroys
//! entities, and hands out snapshots for iteration.
//!
//! ## Iteration
//!
//! ```text
//! Session threads:  create_entity / destroy_entity ──┐
//!                                                     ├─> RwLock<HashMap>
//! Tick thread:      entities() ── snapshot (Vec<Arc>) ┘
//! ```
//!
//! A snapshot is an owned list, so the tick loop never holds the lock while
//! it works. An entity created or destroyed mid-tick may or may not appear
//! in that tick's snapshot; a destroyed entity in a snapshot reports itself
//! as disposed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;

use super::component::Component;
use super::entity::{Entity, EntityId, EntityKind};
use super::events::{LifecycleEvent, LifecycleListener, ListenerId, ListenerSet};
use super::identity::IdAllocator;
use crate::error::{CoreError, CoreResult};

/// Identifier of a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ContextId(u32);

impl ContextId {
    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ctx{}", self.0)
    }
}

/// Context configuration, loadable from TOML.
///
/// ```toml
/// name = "flaris"
/// initial_capacity = 4096
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Name used in logs.
    pub name: String,
    /// Pre-sized capacity of the live-entity set.
    pub initial_capacity: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            name: "world".to_owned(),
            initial_capacity: 1024,
        }
    }
}

impl ContextConfig {
    /// Creates a config with the given name and default capacity.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidConfig`] if the text is not valid TOML or has
    /// fields of the wrong type.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        toml::from_str(text).map_err(|e| CoreError::InvalidConfig(e.to_string()))
    }
}

/// Lifecycle authority for a set of entities.
///
/// # Example
///
/// ```rust,ignore
/// let context = Context::new(ContextConfig::named("flaris"));
///
/// let wolf = context.create_entity(EntityKind::Monster);
/// wolf.add(Position::new(10.0, 0.0, 20.0))?;
///
/// for (entity, position) in context.with_component::<Position>() {
///     // tick systems...
/// }
///
/// context.destroy_entity(&wolf)?;
/// ```
pub struct Context {
    id: ContextId,
    name: String,
    allocator: Arc<IdAllocator>,
    /// Live entities.
    entities: RwLock<HashMap<EntityId, Arc<Entity>>>,
    /// Listeners attached to every entity of this context.
    listeners: ListenerSet,
}

impl Context {
    /// Creates a context that draws ids from the process-wide allocator.
    #[must_use]
    pub fn new(config: ContextConfig) -> Self {
        Self::with_allocator(config, IdAllocator::global())
    }

    /// Creates a context over a caller-supplied allocator.
    ///
    /// Contexts sharing an allocator never produce colliding ids.
    #[must_use]
    pub fn with_allocator(config: ContextConfig, allocator: Arc<IdAllocator>) -> Self {
        let id = ContextId::next();
        tracing::debug!(context = %id, name = %config.name, "context created");
        Self {
            id,
            name: config.name,
            allocator,
            entities: RwLock::new(HashMap::with_capacity(config.initial_capacity)),
            listeners: ListenerSet::default(),
        }
    }

    /// Context id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Context name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    /// Returns `true` if no entity is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }

    /// Returns `true` if `id` names a live entity of this context.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.read().contains_key(&id)
    }

    /// Looks up a live entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Arc<Entity>> {
        self.entities.read().get(&id).cloned()
    }

    /// Creates an entity with no components.
    ///
    /// The entity is live by the time context listeners receive
    /// [`LifecycleEvent::Created`], and that event precedes every other
    /// event on it. A listener may destroy the entity from the callback.
    pub fn create_entity(&self, kind: EntityKind) -> Arc<Entity> {
        let id = self.allocator.allocate();
        let entity = Arc::new(Entity::new(id, self.id, kind, self.listeners.entries()));
        entity.sequenced(|| {
            self.entities.write().insert(id, Arc::clone(&entity));
            tracing::debug!(context = %self.id, entity = %id, ?kind, "entity created");
            entity.emit(&LifecycleEvent::Created { kind });
        });
        entity
    }

    /// Removes `entity` from the live set and disposes it.
    ///
    /// # Returns
    ///
    /// `true` if the entity was live, `false` if it had already been destroyed.
    ///
    /// # Errors
    ///
    /// [`CoreError::ForeignEntity`] if `entity` belongs to another context.
    pub fn destroy_entity(&self, entity: &Entity) -> CoreResult<bool> {
        if entity.context_id() != self.id {
            tracing::warn!(
                context = %self.id,
                owner = %entity.context_id(),
                entity = %entity.id(),
                "refusing to destroy entity owned by another context"
            );
            return Err(CoreError::ForeignEntity {
                entity: entity.id(),
                owner: entity.context_id(),
                context: self.id,
            });
        }

        let removed = self.entities.write().remove(&entity.id()).is_some();
        entity.dispose();
        if removed {
            tracing::debug!(context = %self.id, entity = %entity.id(), "entity destroyed");
        }
        Ok(removed)
    }

    /// Destroys every live entity.
    ///
    /// # Returns
    ///
    /// The number of entities destroyed.
    pub fn destroy_all(&self) -> usize {
        let drained: Vec<Arc<Entity>> = self.entities.write().drain().map(|(_, e)| e).collect();
        for entity in &drained {
            entity.dispose();
        }
        if !drained.is_empty() {
            tracing::debug!(context = %self.id, count = drained.len(), "all entities destroyed");
        }
        drained.len()
    }

    /// Snapshot of the live entities, ordered by id.
    #[must_use]
    pub fn entities(&self) -> EntitySnapshot {
        let mut entities: Vec<Arc<Entity>> = self.entities.read().values().cloned().collect();
        entities.sort_unstable_by_key(|e| e.id());
        EntitySnapshot { entities }
    }

    /// Live entities carrying a `T`, paired with that component.
    #[must_use]
    pub fn with_component<T: Component>(&self) -> Vec<(Arc<Entity>, Arc<T>)> {
        self.entities().with_component::<T>().collect()
    }

    /// Live entities of the given kind.
    #[must_use]
    pub fn of_kind(&self, kind: EntityKind) -> Vec<Arc<Entity>> {
        self.entities()
            .into_iter()
            .filter(|e| e.kind() == kind)
            .collect()
    }

    /// Registers a listener on every current and future entity of this
    /// context. Future entities also report [`LifecycleEvent::Created`].
    pub fn subscribe(&self, listener: Arc<dyn LifecycleListener>) -> ListenerId {
        let id = ListenerId::next();
        self.listeners.push(id, Arc::clone(&listener));
        for entity in self.entities() {
            // Entities disposed since the snapshot simply don't take it.
            let _ = entity.attach(id, Arc::clone(&listener));
        }
        id
    }

    /// Removes a context listener from this context and its entities.
    ///
    /// Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        if !self.listeners.remove(id) {
            return false;
        }
        for entity in self.entities() {
            entity.unsubscribe(id);
        }
        true
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(ContextConfig::default())
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.destroy_all();
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("entities", &self.len())
            .finish_non_exhaustive()
    }
}

/// Owned, id-ordered list of entities taken from a [`Context`].
#[derive(Clone, Debug, Default)]
pub struct EntitySnapshot {
    entities: Vec<Arc<Entity>>,
}

impl EntitySnapshot {
    /// Number of entities in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over the entities.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Entity>> {
        self.entities.iter()
    }

    /// Entities carrying a `T`, paired with that component.
    pub fn with_component<T: Component>(&self) -> impl Iterator<Item = (Arc<Entity>, Arc<T>)> + '_ {
        self.entities
            .iter()
            .filter_map(|e| e.get::<T>().map(|c| (Arc::clone(e), c)))
    }
}

impl IntoIterator for EntitySnapshot {
    type Item = Arc<Entity>;
    type IntoIter = std::vec::IntoIter<Arc<Entity>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl<'a> IntoIterator for &'a EntitySnapshot {
    type Item = &'a Arc<Entity>;
    type IntoIter = std::slice::Iter<'a, Arc<Entity>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

//! # Entity Management
//!
//! An entity is an identity plus at most one component per concrete type.
//!
//! Entities are created by a [`Context`](super::Context) and shared as
//! `Arc<Entity>` between session threads and the tick loop. Every
//! operation on one entity is serialized; different entities never
//! contend with each other.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};
use serde::{Deserialize, Serialize};

use super::component::Component;
use super::context::ContextId;
use super::events::{LifecycleEvent, LifecycleListener, ListenerEntry, ListenerId, ListenerSet};
use super::storage::ComponentSet;
use crate::error::{CoreError, CoreResult};

/// Unique identifier for an entity.
///
/// Allocated once from an [`IdAllocator`](super::IdAllocator) and never
/// reused, so an id always names the same entity even after it is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Null/invalid entity ID. Never allocated.
    pub const NULL: Self = Self(0);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coarse classification of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EntityKind {
    /// Anything else (static objects, triggers).
    #[default]
    Other = 0,
    /// Player character controlled by a session.
    Player = 1,
    /// Hostile creature.
    Monster = 2,
    /// Non-player character.
    Npc = 3,
    /// Item lying in the world.
    Item = 4,
}

impl EntityKind {
    /// Converts from the `repr(u8)` value; unknown values map to `Other`.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Player,
            2 => Self::Monster,
            3 => Self::Npc,
            4 => Self::Item,
            _ => Self::Other,
        }
    }
}

/// A simulated actor.
///
/// # Thread Safety
///
/// - Component reads (`get`, `has`) take a shared lock
/// - Mutations (`add`, `remove`, `modify`, `dispose`) are serialized per
///   entity, and their notifications are delivered before the next mutation
///   on the same entity starts
/// - Listeners run with no component lock held and may call back into the
///   entity on the same thread
///
/// # Example
///
/// ```rust,ignore
/// let player = context.create_entity(EntityKind::Player);
/// player.add(Position::new(0.0, 0.0, 0.0))?;
/// player.add(Health(100))?;
///
/// assert!(player.has::<Health>());
/// player.remove::<Health>()?;
/// context.destroy_entity(&player)?;
/// ```
pub struct Entity {
    /// Immutable identity.
    id: EntityId,
    /// Owning context.
    context: ContextId,
    /// Current [`EntityKind`] as its `repr(u8)` value.
    kind: AtomicU8,
    /// Attached components.
    components: RwLock<ComponentSet>,
    /// Subscribed listeners.
    listeners: ListenerSet,
    /// Serializes mutation + delivery. Reentrant so listeners can call back in.
    sequence: ReentrantMutex<()>,
    /// Set once by `dispose`.
    disposed: AtomicBool,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        context: ContextId,
        kind: EntityKind,
        listeners: Vec<ListenerEntry>,
    ) -> Self {
        Self {
            id,
            context,
            kind: AtomicU8::new(kind as u8),
            components: RwLock::new(ComponentSet::new()),
            listeners: ListenerSet::from_entries(listeners),
            sequence: ReentrantMutex::new(()),
            disposed: AtomicBool::new(false),
        }
    }

    /// The entity id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The context that created this entity.
    #[inline]
    #[must_use]
    pub fn context_id(&self) -> ContextId {
        self.context
    }

    /// Current kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        EntityKind::from_u8(self.kind.load(Ordering::Acquire))
    }

    /// Reclassifies the entity.
    ///
    /// # Errors
    ///
    /// [`CoreError::UseAfterDispose`] if the entity was disposed.
    pub fn set_kind(&self, kind: EntityKind) -> CoreResult<()> {
        let _sequence = self.sequence.lock();
        self.ensure_alive()?;
        self.kind.store(kind as u8, Ordering::Release);
        Ok(())
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Attaches `component`, keyed by its concrete type.
    ///
    /// Raises [`LifecycleEvent::ComponentAdded`] before returning.
    ///
    /// # Errors
    ///
    /// - [`CoreError::DuplicateComponent`] if a `T` is already attached;
    ///   the existing component is left untouched
    /// - [`CoreError::UseAfterDispose`] if the entity was disposed
    pub fn add<T: Component>(&self, component: T) -> CoreResult<Arc<T>> {
        let _sequence = self.sequence.lock();
        self.ensure_alive()?;

        let component = Arc::new(component);
        if !self.components.write().insert(Arc::clone(&component)) {
            return Err(CoreError::DuplicateComponent {
                entity: self.id,
                component: std::any::type_name::<T>(),
            });
        }

        tracing::trace!(entity = %self.id, component = std::any::type_name::<T>(), "component attached");
        self.emit(&LifecycleEvent::ComponentAdded {
            component: Arc::clone(&component) as Arc<dyn Component>,
        });
        Ok(component)
    }

    /// Detaches the `T` if one is attached.
    ///
    /// Raises [`LifecycleEvent::ComponentRemoved`] only when something was
    /// removed; removing an absent type is a silent no-op.
    ///
    /// # Errors
    ///
    /// [`CoreError::UseAfterDispose`] if the entity was disposed.
    pub fn remove<T: Component>(&self) -> CoreResult<Option<Arc<T>>> {
        let _sequence = self.sequence.lock();
        self.ensure_alive()?;

        let removed = self.components.write().remove::<T>();
        if let Some(component) = &removed {
            tracing::trace!(entity = %self.id, component = std::any::type_name::<T>(), "component detached");
            self.emit(&LifecycleEvent::ComponentRemoved {
                component: Arc::clone(component) as Arc<dyn Component>,
            });
        }
        Ok(removed)
    }

    /// Returns the attached `T`, or `None` if absent.
    ///
    /// The handle is a snapshot: later `modify` calls do not change it.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<Arc<T>> {
        self.components.read().get::<T>()
    }

    /// Returns `true` if a `T` is attached.
    #[must_use]
    pub fn has<T: Component>(&self) -> bool {
        self.components.read().contains::<T>()
    }

    /// Mutates the attached `T` in place and returns the closure's result.
    ///
    /// Returns `Ok(None)` if no `T` is attached. No notification is raised.
    /// The closure runs under the entity's write lock and must not call
    /// back into this entity.
    ///
    /// # Errors
    ///
    /// [`CoreError::UseAfterDispose`] if the entity was disposed.
    pub fn modify<T, R, F>(&self, f: F) -> CoreResult<Option<R>>
    where
        T: Component + Clone,
        F: FnOnce(&mut T) -> R,
    {
        let _sequence = self.sequence.lock();
        self.ensure_alive()?;
        Ok(self.components.write().modify(f))
    }

    /// Mutates the attached `T`, or attaches `component` if none is.
    ///
    /// The check and the write happen as one step, so concurrent callers
    /// never race each other into [`CoreError::DuplicateComponent`].
    /// Only the attach path raises [`LifecycleEvent::ComponentAdded`].
    ///
    /// # Returns
    ///
    /// `true` if `component` was attached, `false` if an existing `T` was
    /// modified.
    ///
    /// # Errors
    ///
    /// [`CoreError::UseAfterDispose`] if the entity was disposed.
    pub fn upsert<T, F>(&self, component: T, f: F) -> CoreResult<bool>
    where
        T: Component + Clone,
        F: FnOnce(&mut T),
    {
        let _sequence = self.sequence.lock();
        self.ensure_alive()?;
        if self.components.write().modify(f).is_some() {
            return Ok(false);
        }
        self.add(component).map(|_| true)
    }

    /// Number of attached components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.read().len()
    }

    /// Sorted type names of the attached components.
    #[must_use]
    pub fn component_names(&self) -> Vec<&'static str> {
        self.components.read().names()
    }

    /// Erased handles to every attached component.
    #[must_use]
    pub fn components(&self) -> Vec<Arc<dyn Component>> {
        self.components.read().iter().cloned().collect()
    }

    /// Registers a listener for this entity's events.
    ///
    /// # Errors
    ///
    /// [`CoreError::UseAfterDispose`] if the entity was disposed.
    pub fn subscribe(&self, listener: Arc<dyn LifecycleListener>) -> CoreResult<ListenerId> {
        let id = ListenerId::next();
        self.attach(id, listener)?;
        Ok(id)
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Clears all components and raises [`LifecycleEvent::Disposed`].
    ///
    /// Idempotent: only the first call has any effect. Listeners are
    /// released after the terminal event.
    ///
    /// # Returns
    ///
    /// `true` if this call disposed the entity.
    pub fn dispose(&self) -> bool {
        let _sequence = self.sequence.lock();
        if self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }

        let released = self.components.write().drain();
        tracing::debug!(entity = %self.id, released = released.len(), "entity disposed");
        self.emit(&LifecycleEvent::Disposed {
            released: released.len(),
        });
        self.listeners.clear();
        true
    }

    pub(crate) fn attach(&self, id: ListenerId, listener: Arc<dyn LifecycleListener>) -> CoreResult<()> {
        let _sequence = self.sequence.lock();
        self.ensure_alive()?;
        self.listeners.push(id, listener);
        Ok(())
    }

    /// Runs `f` while holding the entity's sequence lock.
    pub(crate) fn sequenced<R>(&self, f: impl FnOnce() -> R) -> R {
        let _sequence = self.sequence.lock();
        f()
    }

    /// Delivers `event` to every listener on the calling thread.
    pub(crate) fn emit(&self, event: &LifecycleEvent) {
        for (_, listener) in self.listeners.entries() {
            listener.on_event(self, event);
        }
    }

    fn ensure_alive(&self) -> CoreResult<()> {
        if self.is_disposed() {
            Err(CoreError::UseAfterDispose { entity: self.id })
        } else {
            Ok(())
        }
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Entity {}

/// Hashes `id` combined with `kind`.
///
/// The kind is mutable, so key hashed collections by [`EntityId`] rather
/// than by `Entity`.
impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.id.raw() ^ u64::from(self.kind() as u8)).hash(state);
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("context", &self.context)
            .field("kind", &self.kind())
            .field("components", &*self.components.read())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Clone, Debug, PartialEq)]
    struct Health(u32);
    impl Component for Health {}

    #[derive(Clone, Debug, PartialEq)]
    struct Speed;
    impl Component for Speed {}

    fn entity(raw: u64) -> Entity {
        Entity::new(EntityId::new(raw), ContextId::new(0), EntityKind::Player, Vec::new())
    }

    fn recorder(entity: &Entity) -> Arc<Mutex<Vec<&'static str>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        entity
            .subscribe(Arc::new(move |_: &Entity, event: &LifecycleEvent| {
                sink.lock().push(event.label());
            }))
            .unwrap();
        log
    }

    #[test]
    fn test_entity_id_null() {
        assert!(EntityId::NULL.is_null());
        assert!(EntityId::default().is_null());
        assert!(!EntityId::new(7).is_null());
        assert_eq!(EntityId::new(7).to_string(), "#7");
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            EntityKind::Other,
            EntityKind::Player,
            EntityKind::Monster,
            EntityKind::Npc,
            EntityKind::Item,
        ] {
            assert_eq!(EntityKind::from_u8(kind as u8), kind);
        }
        assert_eq!(EntityKind::from_u8(200), EntityKind::Other);
    }

    #[test]
    fn test_add_get_has() {
        let e = entity(1);
        let added = e.add(Health(100)).unwrap();
        assert_eq!(*added, Health(100));
        assert!(e.has::<Health>());
        assert_eq!(e.get::<Health>().unwrap().0, 100);
        assert!(e.get::<Speed>().is_none());
    }

    #[test]
    fn test_duplicate_add_keeps_original() {
        let e = entity(1);
        e.add(Health(100)).unwrap();

        let err = e.add(Health(1)).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateComponent { entity, .. } if entity == e.id()));
        assert_eq!(*e.get::<Health>().unwrap(), Health(100));
    }

    #[test]
    fn test_remove_absent_is_silent() {
        let e = entity(1);
        let log = recorder(&e);

        assert!(e.remove::<Health>().unwrap().is_none());
        assert!(log.lock().is_empty());

        e.add(Health(5)).unwrap();
        assert_eq!(*e.remove::<Health>().unwrap().unwrap(), Health(5));
        assert!(e.remove::<Health>().unwrap().is_none());
        assert_eq!(*log.lock(), vec!["component-added", "component-removed"]);
    }

    #[test]
    fn test_added_event_carries_component() {
        let e = entity(1);
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        e.subscribe(Arc::new(move |_: &Entity, event: &LifecycleEvent| {
            if let Some(health) = event.component().and_then(|c| c.downcast_ref::<Health>()) {
                *sink.lock() = Some(health.0);
            }
        }))
        .unwrap();

        e.add(Health(42)).unwrap();
        assert_eq!(*seen.lock(), Some(42));
    }

    #[test]
    fn test_dispose_is_terminal_and_idempotent() {
        let e = entity(1);
        let log = recorder(&e);
        e.add(Health(1)).unwrap();
        e.add(Speed).unwrap();

        assert!(e.dispose());
        assert!(!e.dispose());

        assert!(e.is_disposed());
        assert!(!e.has::<Health>());
        assert!(!e.has::<Speed>());
        assert_eq!(e.component_count(), 0);
        assert_eq!(e.listener_count(), 0);
        assert_eq!(
            *log.lock(),
            vec!["component-added", "component-added", "disposed"]
        );
    }

    #[test]
    fn test_use_after_dispose_fails() {
        let e = entity(1);
        e.dispose();

        assert_eq!(
            e.add(Health(1)).unwrap_err(),
            CoreError::UseAfterDispose { entity: e.id() }
        );
        assert!(e.remove::<Health>().is_err());
        assert!(e.modify::<Health, _, _>(|h| h.0 += 1).is_err());
        assert!(e.set_kind(EntityKind::Monster).is_err());
        assert!(e.get::<Health>().is_none());
    }

    #[test]
    fn test_modify_raises_nothing() {
        let e = entity(1);
        e.add(Health(10)).unwrap();
        let log = recorder(&e);

        let result = e.modify::<Health, _, _>(|h| {
            h.0 += 5;
            h.0
        });
        assert_eq!(result.unwrap(), Some(15));
        assert_eq!(*e.get::<Health>().unwrap(), Health(15));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_upsert_attaches_then_modifies() {
        let e = entity(1);
        let log = recorder(&e);

        assert!(e.upsert(Health(10), |h| h.0 += 1).unwrap());
        assert_eq!(*e.get::<Health>().unwrap(), Health(10));
        assert!(!e.upsert(Health(10), |h| h.0 += 1).unwrap());
        assert_eq!(*e.get::<Health>().unwrap(), Health(11));

        assert_eq!(e.component_count(), 1);
        assert_eq!(*log.lock(), vec!["component-added"]);

        e.dispose();
        assert!(e.upsert(Health(1), |_| {}).is_err());
    }

    #[test]
    fn test_concurrent_upsert_attaches_once() {
        let e = Arc::new(entity(1));
        let barrier = Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let e = Arc::clone(&e);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    e.upsert(Health(1), |h| h.0 += 1)
                })
            })
            .collect();

        let attached = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .filter(|attached| *attached)
            .count();

        assert_eq!(attached, 1);
        assert_eq!(e.component_count(), 1);
        assert_eq!(e.get::<Health>().unwrap().0, 8);
    }

    #[test]
    fn test_component_listing() {
        let e = entity(1);
        assert!(e.component_names().is_empty());
        assert!(e.components().is_empty());

        e.add(Speed).unwrap();
        e.add(Health(3)).unwrap();

        let names = e.component_names();
        assert_eq!(names.len(), 2);
        assert!(names.windows(2).all(|w| w[0] <= w[1]));
        assert!(names.iter().any(|n| n.ends_with("Health")));
        assert!(names.iter().any(|n| n.ends_with("Speed")));

        let components = e.components();
        assert_eq!(components.len(), 2);
        let health: Vec<_> = components
            .iter()
            .filter_map(|c| c.downcast_ref::<Health>())
            .map(|h| h.0)
            .collect();
        assert_eq!(health, [3]);
    }

    #[test]
    fn test_listener_may_reenter() {
        let e = Arc::new(entity(1));
        let weak = Arc::downgrade(&e);
        e.subscribe(Arc::new(move |_: &Entity, event: &LifecycleEvent| {
            if event.component().is_some_and(|c| c.is::<Health>()) {
                if let Some(e) = weak.upgrade() {
                    if !e.has::<Speed>() {
                        e.add(Speed).unwrap();
                    }
                }
            }
        }))
        .unwrap();

        e.add(Health(1)).unwrap();
        assert!(e.has::<Speed>());
    }

    #[test]
    fn test_equality_by_id() {
        let a = entity(1);
        let b = entity(1);
        let c = entity(2);
        b.set_kind(EntityKind::Monster).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_unsubscribe() {
        let e = entity(1);
        let id = e
            .subscribe(Arc::new(|_: &Entity, _: &LifecycleEvent| {}))
            .unwrap();
        assert_eq!(e.listener_count(), 1);
        assert!(e.unsubscribe(id));
        assert!(!e.unsubscribe(id));
        assert_eq!(e.listener_count(), 0);
    }
}

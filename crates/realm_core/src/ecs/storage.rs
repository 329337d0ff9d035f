//! # Component Storage
//!
//! Type-keyed storage for the components of a single entity.
//!
//! - One slot per concrete component type (`TypeId` key)
//! - Slots hold shared handles, so readers keep a consistent snapshot
//!   while writers replace or mutate the slot
//! - Typed access goes through a checked downcast; a mismatch reads as absent

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use super::component::{downcast_arc, AsAny, Component};

/// Storage for the components attached to one entity.
///
/// Not synchronized on its own; [`Entity`](super::Entity) wraps it in a lock.
///
/// # Example
///
/// ```rust,ignore
/// let mut set = ComponentSet::new();
/// assert!(set.insert(Arc::new(Health(100))));
/// assert!(!set.insert(Arc::new(Health(50)))); // one per type
/// assert_eq!(set.get::<Health>().unwrap().0, 100);
/// ```
#[derive(Default)]
pub struct ComponentSet {
    /// Slot per concrete component type.
    slots: HashMap<TypeId, Arc<dyn Component>>,
}

impl ComponentSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no component is attached.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` if a `T` is attached.
    #[inline]
    #[must_use]
    pub fn contains<T: Component>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<T>())
    }

    /// Attaches `component` unless a `T` is already present.
    ///
    /// # Returns
    ///
    /// `true` if inserted, `false` if the slot was taken (existing value kept).
    pub fn insert<T: Component>(&mut self, component: Arc<T>) -> bool {
        match self.slots.entry(TypeId::of::<T>()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(component);
                true
            }
        }
    }

    /// Returns a shared handle to the attached `T`.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<Arc<T>> {
        let slot = self.slots.get(&TypeId::of::<T>())?;
        downcast_arc::<T>(Arc::clone(slot))
    }

    /// Detaches the `T`, returning it if present.
    pub fn remove<T: Component>(&mut self) -> Option<Arc<T>> {
        let slot = self.slots.remove(&TypeId::of::<T>())?;
        downcast_arc::<T>(slot)
    }

    /// Mutates the attached `T` in place.
    ///
    /// If another handle to the component is alive, the value is cloned
    /// first; earlier readers keep the old value.
    pub fn modify<T, R, F>(&mut self, f: F) -> Option<R>
    where
        T: Component + Clone,
        F: FnOnce(&mut T) -> R,
    {
        let key = TypeId::of::<T>();
        let slot = self.slots.remove(&key)?;
        // Slots are keyed by their own TypeId, so this downcast cannot miss.
        let mut typed = AsAny::into_any_arc(slot).downcast::<T>().ok()?;
        let result = f(Arc::make_mut(&mut typed));
        self.slots.insert(key, typed);
        Some(result)
    }

    /// Type names of all attached components, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.slots.values().map(|c| c.name()).collect();
        names.sort_unstable();
        names
    }

    /// Iterates over the erased components.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Component>> {
        self.slots.values()
    }

    /// Removes every component, handing them back to the caller.
    ///
    /// Returned handles can be dropped after any lock around the set is
    /// released.
    pub fn drain(&mut self) -> Vec<Arc<dyn Component>> {
        self.slots.drain().map(|(_, c)| c).collect()
    }
}

impl std::fmt::Debug for ComponentSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

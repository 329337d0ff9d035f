//! # Component System
//!
//! Components are opaque units of data or behavior, addressed by their
//! concrete type. Nothing is required of a component beyond being
//! thread-safe and `'static`; the type itself is the key.

use std::any::Any;
use std::sync::Arc;

/// Type-erasure bridge used for safe downcasting.
///
/// Blanket-implemented for every `Any + Send + Sync` type, so component
/// authors never implement it by hand.
pub trait AsAny: Any + Send + Sync {
    /// Borrows `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Converts a shared handle into a shared `Any` handle.
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Marker trait for entity components.
///
/// An entity holds at most one instance of each concrete component type.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug)]
/// struct Health {
///     current: u32,
///     max: u32,
/// }
///
/// impl Component for Health {}
///
/// entity.add(Health { current: 100, max: 100 })?;
/// ```
pub trait Component: AsAny {
    /// Human-readable type name, used in errors and logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl dyn Component {
    /// Returns `true` if the erased component is a `T`.
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        AsAny::as_any(self).is::<T>()
    }

    /// Borrows the erased component as a `T`, or `None` on type mismatch.
    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        AsAny::as_any(self).downcast_ref::<T>()
    }
}

/// Recovers a typed handle from an erased one.
///
/// Returns `None` on type mismatch; never an unchecked cast.
#[must_use]
pub fn downcast_arc<T: Component>(component: Arc<dyn Component>) -> Option<Arc<T>> {
    AsAny::into_any_arc(component).downcast::<T>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Mana(u32);
    impl Component for Mana {}

    #[derive(Debug)]
    struct Stamina;
    impl Component for Stamina {}

    #[test]
    fn test_downcast_matching_type() {
        let erased: Arc<dyn Component> = Arc::new(Mana(30));
        assert!(erased.is::<Mana>());
        assert_eq!(erased.downcast_ref::<Mana>(), Some(&Mana(30)));

        let typed = downcast_arc::<Mana>(erased).unwrap();
        assert_eq!(typed.0, 30);
    }

    #[test]
    fn test_downcast_mismatch_is_none() {
        let erased: Arc<dyn Component> = Arc::new(Stamina);
        assert!(!erased.is::<Mana>());
        assert!(erased.downcast_ref::<Mana>().is_none());
        assert!(downcast_arc::<Mana>(erased).is_none());
    }

    #[test]
    fn test_component_name() {
        let erased: Arc<dyn Component> = Arc::new(Mana(1));
        assert!(erased.name().ends_with("Mana"));
    }
}

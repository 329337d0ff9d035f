//! # Lifecycle Events
//!
//! Synchronous notifications raised by entities and contexts.
//!
//! ## Delivery
//!
//! ```text
//! add / remove / dispose ──> Entity ──> listener 1 ──> listener 2 ──> ...
//!                              │
//!                              └── same thread, before the call returns
//! ```
//!
//! Listeners run on the thread that performed the operation, in the order
//! operations were applied to that entity. A listener may call back into the
//! entity it was notified by; it must not block.
//!
//! [`ChannelListener`] forwards events into a crossbeam channel for
//! subsystems that want to process them on their own thread. The forward is
//! still synchronous and ordered, but the consumer sees events after the
//! entity has moved on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;

use super::component::Component;
use super::entity::{Entity, EntityId, EntityKind};

/// Something that happened to an entity.
#[derive(Clone)]
pub enum LifecycleEvent {
    /// The entity was created by its context (context listeners only).
    Created {
        /// Kind at creation.
        kind: EntityKind,
    },

    /// A component was attached.
    ComponentAdded {
        /// The attached component.
        component: Arc<dyn Component>,
    },

    /// A component was detached.
    ComponentRemoved {
        /// The detached component.
        component: Arc<dyn Component>,
    },

    /// The entity was disposed. Terminal: nothing follows it.
    Disposed {
        /// Number of components released by disposal.
        released: usize,
    },
}

impl LifecycleEvent {
    /// Component carried by the event, if any.
    #[must_use]
    pub fn component(&self) -> Option<&dyn Component> {
        match self {
            Self::ComponentAdded { component } | Self::ComponentRemoved { component } => {
                Some(component.as_ref())
            }
            Self::Created { .. } | Self::Disposed { .. } => None,
        }
    }

    /// Returns `true` for the terminal event.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Disposed { .. })
    }

    /// Short name for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::ComponentAdded { .. } => "component-added",
            Self::ComponentRemoved { .. } => "component-removed",
            Self::Disposed { .. } => "disposed",
        }
    }
}

impl std::fmt::Debug for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created { kind } => f.debug_struct("Created").field("kind", kind).finish(),
            Self::ComponentAdded { component } => f
                .debug_struct("ComponentAdded")
                .field("component", &component.name())
                .finish(),
            Self::ComponentRemoved { component } => f
                .debug_struct("ComponentRemoved")
                .field("component", &component.name())
                .finish(),
            Self::Disposed { released } => {
                f.debug_struct("Disposed").field("released", released).finish()
            }
        }
    }
}

/// Receiver of lifecycle events.
///
/// Any `Fn(&Entity, &LifecycleEvent) + Send + Sync` closure is a listener.
pub trait LifecycleListener: Send + Sync {
    /// Called synchronously for every event on a subscribed entity.
    fn on_event(&self, entity: &Entity, event: &LifecycleEvent);
}

impl<F> LifecycleListener for F
where
    F: Fn(&Entity, &LifecycleEvent) + Send + Sync,
{
    #[inline]
    fn on_event(&self, entity: &Entity, event: &LifecycleEvent) {
        self(entity, event);
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocates a process-unique listener id.
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Registered listener.
pub(crate) type ListenerEntry = (ListenerId, Arc<dyn LifecycleListener>);

/// Thread-safe listener registry.
#[derive(Default)]
pub(crate) struct ListenerSet {
    entries: RwLock<Vec<ListenerEntry>>,
}

impl ListenerSet {
    pub(crate) fn from_entries(entries: Vec<ListenerEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub(crate) fn push(&self, id: ListenerId, listener: Arc<dyn LifecycleListener>) {
        self.entries.write().push((id, listener));
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    /// Copies the registrations out so delivery runs without the lock held.
    pub(crate) fn entries(&self) -> Vec<ListenerEntry> {
        self.entries.read().clone()
    }

    pub(crate) fn clear(&self) {
        self.entries.write().clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// Event envelope produced by [`ChannelListener`].
#[derive(Clone, Debug)]
pub struct LifecycleMessage {
    /// Entity the event happened to.
    pub entity: EntityId,
    /// Entity kind at the time of the event.
    pub kind: EntityKind,
    /// The event.
    pub event: LifecycleEvent,
}

/// Listener that forwards events into a bounded crossbeam channel.
///
/// Never blocks: when the channel is full the event is dropped and counted.
///
/// # Example
///
/// ```rust,ignore
/// let (listener, events) = ChannelListener::bounded(4096);
/// context.subscribe(Arc::new(listener));
///
/// // network sync thread
/// for message in events.try_iter() {
///     replicate(message);
/// }
/// ```
pub struct ChannelListener {
    sender: Sender<LifecycleMessage>,
    dropped: AtomicU64,
}

impl ChannelListener {
    /// Creates a listener and the receiving end of its channel.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, Receiver<LifecycleMessage>) {
        let (sender, receiver) = bounded(capacity);
        (
            Self {
                sender,
                dropped: AtomicU64::new(0),
            },
            receiver,
        )
    }

    /// Number of events dropped because the channel was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl LifecycleListener for ChannelListener {
    fn on_event(&self, entity: &Entity, event: &LifecycleEvent) {
        let message = LifecycleMessage {
            entity: entity.id(),
            kind: entity.kind(),
            event: event.clone(),
        };
        match self.sender.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    entity = %message.entity,
                    event = message.event.label(),
                    "lifecycle channel full, event dropped"
                );
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!(entity = %entity.id(), "lifecycle channel closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;
    impl Component for Marker {}

    #[test]
    fn test_event_accessors() {
        let added = LifecycleEvent::ComponentAdded {
            component: Arc::new(Marker),
        };
        assert!(added.component().is_some_and(|c| c.is::<Marker>()));
        assert!(!added.is_terminal());
        assert_eq!(added.label(), "component-added");

        let disposed = LifecycleEvent::Disposed { released: 3 };
        assert!(disposed.component().is_none());
        assert!(disposed.is_terminal());
    }

    #[test]
    fn test_listener_set_remove() {
        let set = ListenerSet::default();
        let a = ListenerId::next();
        let b = ListenerId::next();
        set.push(a, Arc::new(|_: &Entity, _: &LifecycleEvent| {}));
        set.push(b, Arc::new(|_: &Entity, _: &LifecycleEvent| {}));

        assert!(set.remove(a));
        assert!(!set.remove(a));
        assert_eq!(set.len(), 1);

        set.clear();
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_listener_ids_unique() {
        assert_ne!(ListenerId::next(), ListenerId::next());
    }
}

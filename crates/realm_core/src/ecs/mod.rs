//! # Entity Component System
//!
//! Entities as identities plus an open-ended set of typed components.
//!
//! ## Design Philosophy
//!
//! - One component per concrete type per entity, no class hierarchy
//! - Typed access through checked downcasts only
//! - Each entity is its own unit of locking; entities never contend
//! - Lifecycle notifications are synchronous and ordered per entity

mod component;
mod context;
mod entity;
mod events;
mod identity;
mod storage;

pub use component::{downcast_arc, AsAny, Component};
pub use context::{Context, ContextConfig, ContextId, EntitySnapshot};
pub use entity::{Entity, EntityId, EntityKind};
pub use events::{ChannelListener, LifecycleEvent, LifecycleListener, LifecycleMessage, ListenerId};
pub use identity::IdAllocator;
pub use storage::ComponentSet;

//! # REALM Core
//!
//! Entity-management core for a persistent multi-actor world server.
//!
//! Every simulated actor (player, monster, NPC, item, static object) is an
//! [`Entity`]: an identity plus at most one component per concrete type.
//! A [`Context`] owns the entities of one world instance and is the only
//! place entities are created and destroyed.
//!
//! ## Threading Rules
//!
//! 1. **Per-entity serialization** - operations on one entity never interleave
//! 2. **No cross-entity locks** - different entities are independent
//! 3. **Snapshot iteration** - the tick loop iterates an owned snapshot
//! 4. **Synchronous notification** - listeners run on the mutating thread
//!
//! ## Example
//!
//! ```rust,ignore
//! use realm_core::{Component, Context, ContextConfig, EntityKind};
//!
//! #[derive(Clone)]
//! struct Health(u32);
//! impl Component for Health {}
//!
//! let context = Context::new(ContextConfig::named("flaris"));
//! let player = context.create_entity(EntityKind::Player);
//! player.add(Health(100))?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod error;

pub use ecs::{
    downcast_arc, AsAny, ChannelListener, Component, ComponentSet, Context, ContextConfig,
    ContextId, Entity, EntityId, EntityKind, EntitySnapshot, IdAllocator, LifecycleEvent,
    LifecycleListener, LifecycleMessage, ListenerId,
};
pub use error::{CoreError, CoreResult};

//! # REALM World
//!
//! Ground-plane layout of a world instance.
//!
//! - [`Region`]: immutable zone shapes with containment and uniform sampling
//! - [`ZoneMap`]: named zones loaded from TOML map files
//! - [`Spawner`]: seeded placement of actors into respawn zones
//!
//! ## Example
//!
//! ```rust,ignore
//! use realm_core::{Context, ContextConfig};
//! use realm_world::{Spawner, ZoneMap};
//!
//! let context = Context::new(ContextConfig::named("flaris"));
//! let zones = ZoneMap::from_toml_str(include_str!("flaris.toml"))?;
//! Spawner::new(42).populate(&context, &zones)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod components;
pub mod error;
pub mod region;
pub mod spawner;
pub mod zone;

pub use components::{Position, SpawnOrigin};
pub use error::{WorldError, WorldResult};
pub use region::{Circle, Polygon, Rectangle, Region, MAX_SAMPLE_ATTEMPTS};
pub use spawner::Spawner;
pub use zone::{
    ShapeConfig, SpawnRule, Zone, ZoneConfig, ZoneKind, ZoneMap, ZoneMapConfig, ZoneTransition,
};

//! # REALM Shared
//!
//! Value types used across the workspace.
//!
//! World coordinates follow the ground-plane convention: `x` and `z` span the
//! ground, `y` is height. Region and zone logic only ever looks at `x`/`z`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod math;

pub use math::{Vec2, Vec3};

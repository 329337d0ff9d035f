//! # Core Error Types
//!
//! Contract violations surfaced synchronously to the caller. None of them
//! is transient and none is retried; higher layers decide whether to log
//! and continue or abort what they were doing.

use thiserror::Error;

use crate::ecs::{ContextId, EntityId};

/// Errors raised by entity and context operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A component of this type is already attached.
    #[error("entity {entity} already has a {component} component")]
    DuplicateComponent {
        /// The entity.
        entity: EntityId,
        /// Type name of the component.
        component: &'static str,
    },

    /// The entity was disposed and can no longer be mutated.
    #[error("entity {entity} has been disposed")]
    UseAfterDispose {
        /// The disposed entity.
        entity: EntityId,
    },

    /// The entity belongs to a different context.
    #[error("entity {entity} belongs to {owner}, not {context}")]
    ForeignEntity {
        /// The entity.
        entity: EntityId,
        /// Context that owns it.
        owner: ContextId,
        /// Context that was asked to act on it.
        context: ContextId,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

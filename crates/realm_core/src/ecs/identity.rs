//! # Identity Allocation
//!
//! Entity ids come from a monotonically increasing atomic counter.
//! An id is never handed out twice by the same allocator, so a stale
//! reference can never be confused with a newer entity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use super::entity::EntityId;

/// Thread-safe entity id allocator.
///
/// # Example
///
/// ```rust,ignore
/// let ids = IdAllocator::new();
/// let a = ids.allocate();
/// let b = ids.allocate();
/// assert_ne!(a, b);
/// ```
#[derive(Debug)]
pub struct IdAllocator {
    /// Next raw id to hand out.
    next: AtomicU64,
}

impl IdAllocator {
    /// Creates an allocator whose first id is `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates an allocator whose first id is `first`.
    ///
    /// `0` is reserved for [`EntityId::NULL`] and is bumped to `1`.
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        let first = if first == 0 { 1 } else { first };
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// The process-wide allocator shared by contexts that don't bring their own.
    ///
    /// Ids from it are unique across every such context.
    #[must_use]
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<IdAllocator>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(IdAllocator::new())))
    }

    /// Allocates a fresh id.
    ///
    /// A 64-bit counter does not wrap within the lifetime of a process.
    #[inline]
    pub fn allocate(&self) -> EntityId {
        EntityId::new(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value the next call to [`allocate`](Self::allocate) will return.
    #[must_use]
    pub fn peek_next(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

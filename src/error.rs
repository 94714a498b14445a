//! Error taxonomy for the simulation core
//!
//! Only two conditions surface as errors: running out of fixed capacity
//! (recoverable, the request is dropped without touching existing state)
//! and failing the up-front pool allocation (fatal to the instance).
//! Stale entity handles are detected and reported so callers can treat
//! them as no-ops; they never crash the core.

use thiserror::Error;

/// Errors the simulation core can report to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimError {
    /// A fixed-capacity store is full; nothing was created or modified.
    #[error("capacity exceeded ({capacity} slots)")]
    CapacityExceeded { capacity: usize },

    /// Up-front state allocation failed. The host must discard the
    /// instance and must not tick it.
    #[error("failed to allocate simulation state")]
    AllocationFailed,

    /// An entity handle did not resolve (stale after the entity died, or
    /// never issued by this instance). The operation was a no-op.
    #[error("invalid entity handle {id}")]
    InvalidHandle { id: u32 },
}

//! Repository layer: the index store and its durable wrapper.
//!
//! # Responsibility
//! - Define access-pattern oriented repository contracts.
//! - Hold all entity state in memory behind one reader/writer lock.
//! - Persist whole-state snapshots after every successful mutation.
//!
//! # Invariants
//! - Reads report absence as `Ok(None)` / empty lists, never as errors.
//! - Data crossing the repository boundary is copied in both directions.
//! - Repositories never call back into services.

pub mod contracts;
pub mod file_repo;
pub mod memory_repo;
pub mod snapshot;
mod state;

pub use state::StoreStats;

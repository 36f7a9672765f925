//! Object store port for lineage consolidation.
//!
//! The consolidation engine keeps no state of its own between invocations.
//! Everything it knows about a run lives in an external key/blob store that
//! it reaches through the [`ObjectStore`] trait.
//!
//! # Storage Backends
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based fake with failure injection,
//!   for tests and embedding
//! - [`FsObjectStore`] -- directory-backed store for local runs
//!
//! # Contract
//!
//! 1. A key is never overwritten: `write_if_absent` on an existing key is a
//!    no-op that reports [`WriteOutcome::AlreadyPresent`].
//! 2. Reads of a missing key fail with [`StoreError::NotFound`].
//! 3. Prefix listings are snapshots; they may miss a write still in flight.
//! 4. The store never interprets payloads.
//! 5. Backend failures are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

#[cfg(test)]
mod contract;

pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::{InMemoryObjectStore, OpCounts};
pub use traits::{ObjectStore, WriteOutcome};

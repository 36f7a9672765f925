//! Lineage event consolidation.
//!
//! Producers report a run piecemeal: one event with some inputs, another
//! with some outputs, often on different machines. This crate accumulates
//! those partial events in an external object store, keyed by run and
//! dataset content, and emits a single merged record once the run has
//! reported at least one input and one output.
//!
//! The engine keeps no state between calls. Every dataset is written under
//! `{runId}/Input/{contentKey}` or `{runId}/Output/{contentKey}` with
//! write-if-absent semantics, so redelivery and concurrent delivery are
//! harmless and a failed call can simply be retried.
//!
//! # Quick Start
//!
//! ```rust
//! use lineage_consolidate::MessageConsolidator;
//! use lineage_store::InMemoryObjectStore;
//! use lineage_types::{Dataset, LineageEvent};
//!
//! # tokio_test_block(async {
//! let engine = MessageConsolidator::with_defaults(InMemoryObjectStore::new());
//!
//! let reads = LineageEvent {
//!     inputs: vec![Dataset::new("/raw/sales", "abfss://lake")],
//!     ..Default::default()
//! };
//! assert!(engine.consolidate_event(reads, "R1").await.unwrap().is_none());
//!
//! let writes = LineageEvent {
//!     outputs: vec![Dataset::new("/curated/sales", "abfss://lake")],
//!     ..Default::default()
//! };
//! let record = engine.consolidate_event(writes, "R1").await.unwrap().unwrap();
//! assert_eq!(record.inputs.len(), 1);
//! assert_eq!(record.outputs.len(), 1);
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread()
//! #         .enable_all()
//! #         .build()
//! #         .unwrap()
//! #         .block_on(f)
//! # }
//! ```

pub mod config;
pub mod consolidator;
pub mod error;
pub mod report;
pub mod stages;

// Re-exports for convenience.
pub use config::{ConsolidationConfig, CorruptEntryPolicy, DEFAULT_CONTAINER};
pub use consolidator::MessageConsolidator;
pub use error::{ConsolidationError, Result};
pub use report::{
    CaptureReport, Consolidation, ConsolidationReport, ConsolidationRun, DiscoveredKeys,
    MergeReport,
};
pub use stages::{CaptureStage, ConsolidationStage, DiscoveryStage, ValidationStage};

// Re-export key types
pub use lineage_store::{ObjectStore, StoreError};
pub use lineage_types::{Dataset, DatasetSide, LineageEvent, RunId};

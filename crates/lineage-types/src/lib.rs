//! Foundation types for lineage consolidation.
//!
//! A data-processing run is often reported through several partial lineage
//! events. These types describe the events, the datasets they carry, and the
//! keys under which those datasets accumulate in an object store.
//!
//! # Key Types
//!
//! - [`RunId`] -- Caller-supplied identifier grouping partial deliveries
//! - [`ContentKey`] -- SHA-256 digest of a dataset's name and namespace
//! - [`Dataset`] -- Input or output record, extra members kept verbatim
//! - [`LineageEvent`] -- One (possibly partial) delivery for a run
//! - [`layout`] -- `{runId}/{Input|Output}/{contentKey}` key scheme

pub mod dataset;
pub mod error;
pub mod event;
pub mod key;
pub mod layout;
pub mod run;

pub use dataset::{Dataset, DatasetRef, DatasetSide};
pub use error::TypeError;
pub use event::{JobInfo, LineageEvent, RunInfo};
pub use key::ContentKey;
pub use run::RunId;

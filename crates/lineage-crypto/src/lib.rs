//! Content addressing for lineage consolidation.
//!
//! Keys must agree across processes, hosts, and earlier deployments, so the
//! digest input is fixed: the UTF-8 bytes of the dataset name immediately
//! followed by the UTF-8 bytes of its namespace, hashed with SHA-256.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod addressor;

pub use addressor::ContentAddressor;

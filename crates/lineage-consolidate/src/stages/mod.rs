//! The stages a partial event passes through, in order:
//! validation, capture, discovery, consolidation.

pub mod capture;
pub mod consolidation;
pub mod discovery;
pub mod validation;

pub use capture::CaptureStage;
pub use consolidation::ConsolidationStage;
pub use discovery::DiscoveryStage;
pub use validation::ValidationStage;

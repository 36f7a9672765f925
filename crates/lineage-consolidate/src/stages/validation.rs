use lineage_types::RunId;

use crate::error::{ConsolidationError, Result};

/// Structural validation stage.
///
/// Runs before any store interaction so a bad delivery fails fast without
/// leaving anything behind.
pub struct ValidationStage;

impl ValidationStage {
    pub fn name(&self) -> &str {
        "validation"
    }

    /// Check the caller-supplied run identifier, the only field partial
    /// events are grouped by. Dataset names and namespaces may be empty.
    pub fn run(&self, run_id: &str) -> Result<RunId> {
        RunId::new(run_id).map_err(|e| ConsolidationError::Validation(e.to_string()))
    }
}

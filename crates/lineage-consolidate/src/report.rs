use std::time::Duration;

use lineage_types::{DatasetSide, LineageEvent, RunId};

/// What the capture stage did with the datasets of one event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaptureReport {
    /// Datasets newly written to the store.
    pub written: usize,
    /// Datasets already present (found by the existence check or by losing
    /// a write race).
    pub skipped: usize,
}

impl CaptureReport {
    pub fn total(&self) -> usize {
        self.written + self.skipped
    }
}

/// Storage keys accumulated for a run, as observed by one listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscoveredKeys {
    /// Sorted keys under `{runId}/Input/`.
    pub inputs: Vec<String>,
    /// Sorted keys under `{runId}/Output/`.
    pub outputs: Vec<String>,
}

impl DiscoveredKeys {
    pub fn side(&self, side: DatasetSide) -> &[String] {
        match side {
            DatasetSide::Input => &self.inputs,
            DatasetSide::Output => &self.outputs,
        }
    }

    /// At least one input and one output have been accumulated.
    pub fn is_resolvable(&self) -> bool {
        !self.inputs.is_empty() && !self.outputs.is_empty()
    }
}

/// Counts from merging accumulated entries into the triggering event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub merged_inputs: usize,
    pub merged_outputs: usize,
    /// Entries left out because they could not be decoded.
    pub dropped_inputs: usize,
    pub dropped_outputs: usize,
}

/// Outcome of consolidating one delivery.
#[derive(Clone, Debug, PartialEq)]
pub enum Consolidation {
    /// The run has both inputs and outputs; this is the merged record.
    Consolidated(LineageEvent),
    /// The run is not yet resolvable. Nothing should be emitted.
    Incomplete {
        inputs_seen: usize,
        outputs_seen: usize,
    },
}

impl Consolidation {
    pub fn is_consolidated(&self) -> bool {
        matches!(self, Self::Consolidated(_))
    }

    /// The merged record, or `None` when the run is incomplete.
    pub fn into_record(self) -> Option<LineageEvent> {
        match self {
            Self::Consolidated(event) => Some(event),
            Self::Incomplete { .. } => None,
        }
    }
}

/// Per-stage figures for one pass through the engine.
#[derive(Clone, Debug)]
pub struct ConsolidationReport {
    pub run_id: RunId,
    pub capture: CaptureReport,
    pub discovered_inputs: usize,
    pub discovered_outputs: usize,
    /// Present only when the run was resolvable.
    pub merge: Option<MergeReport>,
    /// Wall-clock time for the whole pass.
    pub elapsed: Duration,
}

/// Result of [`MessageConsolidator::process`](crate::MessageConsolidator::process).
#[derive(Clone, Debug)]
pub struct ConsolidationRun {
    pub outcome: Consolidation,
    pub report: ConsolidationReport,
}

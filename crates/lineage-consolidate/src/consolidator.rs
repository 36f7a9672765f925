use std::time::Instant;

use tracing::{debug, error, info};

use lineage_crypto::ContentAddressor;
use lineage_store::ObjectStore;
use lineage_types::{layout, Dataset, DatasetSide, LineageEvent, RunId};

use crate::config::ConsolidationConfig;
use crate::error::Result;
use crate::report::{Consolidation, ConsolidationReport, ConsolidationRun};
use crate::stages::{CaptureStage, ConsolidationStage, DiscoveryStage, ValidationStage};

// ---------------------------------------------------------------------------
// MessageConsolidator
// ---------------------------------------------------------------------------

/// Accumulates partial lineage events per run and emits one merged record
/// once the run has both inputs and outputs.
///
/// Holds no run state of its own. Every invocation goes through the store,
/// so any number of consolidators, in any number of processes, can serve
/// deliveries for the same run.
///
/// Pipeline: Validation -> Capture -> Discovery -> Consolidation.
pub struct MessageConsolidator<S> {
    store: S,
    addressor: ContentAddressor,
    config: ConsolidationConfig,
}

impl<S: ObjectStore> MessageConsolidator<S> {
    /// Create a consolidator over `store`. Fails if `config` is invalid.
    pub fn new(store: S, config: ConsolidationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            addressor: ContentAddressor::new(),
            config,
        })
    }

    /// Create a consolidator with the default configuration.
    pub fn with_defaults(store: S) -> Self {
        Self {
            store,
            addressor: ContentAddressor::new(),
            config: ConsolidationConfig::default(),
        }
    }

    pub fn config(&self) -> &ConsolidationConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The key under which `dataset` is captured for `run`.
    pub fn storage_key(&self, run: &RunId, side: DatasetSide, dataset: &Dataset) -> String {
        layout::dataset_key(run, side, &self.addressor.key_for_dataset(dataset))
    }

    /// Capture a partial event and return the consolidated record if the run
    /// is now complete.
    ///
    /// `Ok(None)` means the event was accumulated but the run has not yet
    /// reported both inputs and outputs. Nothing needs to be emitted.
    pub async fn consolidate_event(
        &self,
        event: LineageEvent,
        run_id: &str,
    ) -> Result<Option<LineageEvent>> {
        let run = self.process(event, run_id).await?;
        Ok(run.outcome.into_record())
    }

    /// Like [`Self::consolidate_event`], also returning per-stage figures.
    ///
    /// Failures are logged with the run id and then returned unchanged.
    /// Every store effect is idempotent, so the caller may retry the whole
    /// event.
    pub async fn process(&self, event: LineageEvent, run_id: &str) -> Result<ConsolidationRun> {
        match self.run_pipeline(event, run_id).await {
            Ok(run) => Ok(run),
            Err(e) => {
                error!(run_id, error = %e, retryable = e.is_retryable(), "consolidation failed");
                Err(e)
            }
        }
    }

    async fn run_pipeline(&self, event: LineageEvent, run_id: &str) -> Result<ConsolidationRun> {
        let started = Instant::now();

        let validation = ValidationStage;
        let run = validation.run(run_id)?;
        debug!(run_id = %run, stage = validation.name(), "stage passed");

        let capture_stage = CaptureStage::new(&self.store, &self.config);
        let capture = capture_stage.run(&event, &run).await?;
        debug!(run_id = %run, stage = capture_stage.name(), "stage passed");

        let discovery = DiscoveryStage::new(&self.store, &self.config);
        let keys = discovery.run(&run).await?;
        debug!(run_id = %run, stage = discovery.name(), "stage passed");

        let consolidation = ConsolidationStage::new(&self.store, &self.config);
        let (outcome, merge) = consolidation.run(event, &keys).await?;
        debug!(run_id = %run, stage = consolidation.name(), "stage passed");

        let report = ConsolidationReport {
            run_id: run,
            capture,
            discovered_inputs: keys.inputs.len(),
            discovered_outputs: keys.outputs.len(),
            merge,
            elapsed: started.elapsed(),
        };

        match &outcome {
            Consolidation::Consolidated(record) => info!(
                run_id = %report.run_id,
                inputs = record.inputs.len(),
                outputs = record.outputs.len(),
                elapsed = ?report.elapsed,
                "run consolidated"
            ),
            Consolidation::Incomplete {
                inputs_seen,
                outputs_seen,
            } => debug!(
                run_id = %report.run_id,
                inputs_seen,
                outputs_seen,
                "run incomplete; nothing to emit"
            ),
        }

        Ok(ConsolidationRun { outcome, report })
    }
}

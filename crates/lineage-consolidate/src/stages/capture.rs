use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use lineage_crypto::ContentAddressor;
use lineage_store::{ObjectStore, WriteOutcome};
use lineage_types::{layout, Dataset, DatasetSide, LineageEvent, RunId};

use crate::config::ConsolidationConfig;
use crate::error::Result;
use crate::report::CaptureReport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CaptureAction {
    Written,
    Skipped,
}

/// Persists every dataset of a partial event under its content key.
///
/// Each dataset is handled independently: serialize, derive the key, check
/// existence, write if absent. Up to `max_concurrency` of these run at once.
/// The first store failure fails the stage; datasets captured before it stay
/// captured, and re-delivering the event skips them.
pub struct CaptureStage<'a, S: ?Sized> {
    store: &'a S,
    config: &'a ConsolidationConfig,
    addressor: ContentAddressor,
}

impl<'a, S: ObjectStore + ?Sized> CaptureStage<'a, S> {
    pub fn new(store: &'a S, config: &'a ConsolidationConfig) -> Self {
        Self {
            store,
            config,
            addressor: ContentAddressor::new(),
        }
    }

    pub fn name(&self) -> &str {
        "capture"
    }

    pub async fn run(&self, event: &LineageEvent, run: &RunId) -> Result<CaptureReport> {
        let actions: Vec<CaptureAction> = stream::iter(event.tagged_datasets())
            .map(|(side, dataset)| self.capture_one(run, side, dataset))
            .buffer_unordered(self.config.max_concurrency)
            .try_collect()
            .await?;

        let written = actions
            .iter()
            .filter(|a| **a == CaptureAction::Written)
            .count();
        let report = CaptureReport {
            written,
            skipped: actions.len() - written,
        };
        debug!(
            run_id = %run,
            written = report.written,
            skipped = report.skipped,
            "captured partial event"
        );
        Ok(report)
    }

    async fn capture_one(
        &self,
        run: &RunId,
        side: DatasetSide,
        dataset: &Dataset,
    ) -> Result<CaptureAction> {
        let payload = dataset.to_canonical_json()?;
        let content_key = self.addressor.key_for_dataset(dataset);
        let key = layout::dataset_key(run, side, &content_key);
        let container = self.config.container.as_str();

        if self.store.exists(container, &key).await? {
            debug!(%key, dataset = %dataset.reference(), "dataset already captured");
            return Ok(CaptureAction::Skipped);
        }

        match self.store.write_if_absent(container, &key, payload).await? {
            WriteOutcome::Written => {
                debug!(%key, dataset = %dataset.reference(), "dataset captured");
                Ok(CaptureAction::Written)
            }
            WriteOutcome::AlreadyPresent => {
                debug!(%key, "lost capture race; dataset already present");
                Ok(CaptureAction::Skipped)
            }
        }
    }
}

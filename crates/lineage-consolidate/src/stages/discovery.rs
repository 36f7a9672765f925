use tracing::debug;

use lineage_store::ObjectStore;
use lineage_types::{layout, DatasetSide, RunId};

use crate::config::ConsolidationConfig;
use crate::error::Result;
use crate::report::DiscoveredKeys;

/// Lists everything accumulated for a run so far, by any invocation.
///
/// A listing is a snapshot: a write still in flight elsewhere may be missing
/// and is picked up by a later delivery's discovery.
pub struct DiscoveryStage<'a, S: ?Sized> {
    store: &'a S,
    config: &'a ConsolidationConfig,
}

impl<'a, S: ObjectStore + ?Sized> DiscoveryStage<'a, S> {
    pub fn new(store: &'a S, config: &'a ConsolidationConfig) -> Self {
        Self { store, config }
    }

    pub fn name(&self) -> &str {
        "discovery"
    }

    pub async fn run(&self, run: &RunId) -> Result<DiscoveredKeys> {
        let container = self.config.container.as_str();
        let input_prefix = layout::side_prefix(run, DatasetSide::Input);
        let output_prefix = layout::side_prefix(run, DatasetSide::Output);

        let (mut inputs, mut outputs) = tokio::try_join!(
            self.store.list_by_prefix(container, &input_prefix),
            self.store.list_by_prefix(container, &output_prefix),
        )?;

        // Sorted keys give the merged record a stable dataset order.
        inputs.sort();
        inputs.dedup();
        outputs.sort();
        outputs.dedup();

        debug!(
            run_id = %run,
            inputs = inputs.len(),
            outputs = outputs.len(),
            "discovered accumulated datasets"
        );
        Ok(DiscoveredKeys { inputs, outputs })
    }
}

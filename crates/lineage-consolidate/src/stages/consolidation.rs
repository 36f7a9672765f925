use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use lineage_store::{ObjectStore, StoreError};
use lineage_types::{Dataset, DatasetSide, LineageEvent};

use crate::config::{ConsolidationConfig, CorruptEntryPolicy};
use crate::error::{ConsolidationError, Result};
use crate::report::{Consolidation, DiscoveredKeys, MergeReport};

/// Datasets decoded from one side of the accumulated run state.
struct SideMerge {
    datasets: Vec<Dataset>,
    dropped: usize,
}

/// Merges everything accumulated for a run into the triggering event.
///
/// Runs only when discovery found at least one input and one output; any
/// other case yields [`Consolidation::Incomplete`] without reading the store.
pub struct ConsolidationStage<'a, S: ?Sized> {
    store: &'a S,
    config: &'a ConsolidationConfig,
}

impl<'a, S: ObjectStore + ?Sized> ConsolidationStage<'a, S> {
    pub fn new(store: &'a S, config: &'a ConsolidationConfig) -> Self {
        Self { store, config }
    }

    pub fn name(&self) -> &str {
        "consolidation"
    }

    pub async fn run(
        &self,
        mut event: LineageEvent,
        keys: &DiscoveredKeys,
    ) -> Result<(Consolidation, Option<MergeReport>)> {
        if !keys.is_resolvable() {
            debug!(
                inputs = keys.inputs.len(),
                outputs = keys.outputs.len(),
                "run not yet resolvable"
            );
            let outcome = Consolidation::Incomplete {
                inputs_seen: keys.inputs.len(),
                outputs_seen: keys.outputs.len(),
            };
            return Ok((outcome, None));
        }

        let (inputs, outputs) = tokio::try_join!(
            self.fetch_side(DatasetSide::Input, &keys.inputs),
            self.fetch_side(DatasetSide::Output, &keys.outputs),
        )?;

        let report = MergeReport {
            merged_inputs: inputs.datasets.len(),
            merged_outputs: outputs.datasets.len(),
            dropped_inputs: inputs.dropped,
            dropped_outputs: outputs.dropped,
        };

        // A side whose entries all failed to decode keeps the event's own list.
        if !inputs.datasets.is_empty() {
            event.inputs = inputs.datasets;
        }
        if !outputs.datasets.is_empty() {
            event.outputs = outputs.datasets;
        }

        Ok((Consolidation::Consolidated(event), Some(report)))
    }

    /// Reads every key of one side, preserving key order.
    async fn fetch_side(&self, side: DatasetSide, keys: &[String]) -> Result<SideMerge> {
        let container = self.config.container.as_str();
        let entries: Vec<std::result::Result<Dataset, String>> = stream::iter(keys)
            .map(|key| async move {
                match self.store.read(container, key).await {
                    Ok(payload) => Ok(decode_entry(&payload)),
                    Err(StoreError::InvalidPayload { .. }) => {
                        Ok(Err("payload is not UTF-8 text".to_string()))
                    }
                    Err(e) => Err(e),
                }
            })
            .buffered(self.config.max_concurrency)
            .try_collect()
            .await?;

        let mut merge = SideMerge {
            datasets: Vec::with_capacity(entries.len()),
            dropped: 0,
        };
        for (key, entry) in keys.iter().zip(entries) {
            match entry {
                Ok(dataset) => merge.datasets.push(dataset),
                Err(reason) => match self.config.corrupt_entries {
                    CorruptEntryPolicy::Drop => {
                        warn!(%key, %side, %reason, "dropping unreadable accumulated entry");
                        merge.dropped += 1;
                    }
                    CorruptEntryPolicy::Fail => {
                        return Err(ConsolidationError::CorruptEntry {
                            key: key.clone(),
                            reason,
                        });
                    }
                },
            }
        }
        Ok(merge)
    }
}

fn decode_entry(payload: &str) -> std::result::Result<Dataset, String> {
    match Dataset::from_stored_json(payload) {
        Ok(Some(dataset)) => Ok(dataset),
        Ok(None) => Err("entry is null".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_store::InMemoryObjectStore;

    const C: &str = "ol-synapsemessages";

    fn keys(inputs: &[&str], outputs: &[&str]) -> DiscoveredKeys {
        DiscoveredKeys {
            inputs: inputs.iter().map(|k| k.to_string()).collect(),
            outputs: outputs.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn seeded() -> InMemoryObjectStore {
        let store = InMemoryObjectStore::new();
        store.insert_raw(C, "R1/Input/A", r#"{"name":"a","namespace":"ns"}"#);
        store.insert_raw(C, "R1/Input/B", r#"{"name":"b","namespace":"ns"}"#);
        store.insert_raw(C, "R1/Output/C", r#"{"name":"c","namespace":"ns"}"#);
        store
    }

    fn trigger() -> LineageEvent {
        LineageEvent {
            outputs: vec![Dataset::new("c", "ns")],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn incomplete_run_reads_nothing() {
        let store = seeded();
        let config = ConsolidationConfig::default();
        let (outcome, report) = ConsolidationStage::new(&store, &config)
            .run(trigger(), &keys(&[], &["R1/Output/C"]))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Consolidation::Incomplete {
                inputs_seen: 0,
                outputs_seen: 1
            }
        );
        assert!(report.is_none());
        assert_eq!(store.op_counts().reads, 0);
    }

    #[tokio::test]
    async fn replaces_both_lists_in_key_order() {
        let store = seeded();
        let config = ConsolidationConfig::default();
        let (outcome, report) = ConsolidationStage::new(&store, &config)
            .run(trigger(), &keys(&["R1/Input/A", "R1/Input/B"], &["R1/Output/C"]))
            .await
            .unwrap();

        let merged = outcome.into_record().unwrap();
        let names: Vec<_> = merged.inputs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(merged.outputs, vec![Dataset::new("c", "ns")]);
        assert_eq!(
            report.unwrap(),
            MergeReport {
                merged_inputs: 2,
                merged_outputs: 1,
                dropped_inputs: 0,
                dropped_outputs: 0,
            }
        );
    }

    #[tokio::test]
    async fn drops_unreadable_entries_by_default() {
        let store = seeded();
        store.insert_raw(C, "R1/Input/Z", "{not json");
        let config = ConsolidationConfig::default();
        let (outcome, report) = ConsolidationStage::new(&store, &config)
            .run(trigger(), &keys(&["R1/Input/A", "R1/Input/Z"], &["R1/Output/C"]))
            .await
            .unwrap();

        let merged = outcome.into_record().unwrap();
        assert_eq!(merged.inputs, vec![Dataset::new("a", "ns")]);
        assert_eq!(report.unwrap().dropped_inputs, 1);
    }

    #[tokio::test]
    async fn side_with_only_corrupt_entries_keeps_event_list() {
        let store = seeded();
        store.insert_raw(C, "R1/Input/N", "null");
        store.insert_raw(C, "R1/Input/M", r#"{"facets":{}}"#);
        let config = ConsolidationConfig::default();
        let mut event = trigger();
        event.inputs = vec![Dataset::new("own", "ns")];

        let (outcome, report) = ConsolidationStage::new(&store, &config)
            .run(event, &keys(&["R1/Input/M", "R1/Input/N"], &["R1/Output/C"]))
            .await
            .unwrap();

        let merged = outcome.into_record().unwrap();
        assert_eq!(merged.inputs, vec![Dataset::new("own", "ns")]);
        assert_eq!(report.unwrap().dropped_inputs, 2);
    }

    #[tokio::test]
    async fn strict_policy_fails_on_corrupt_entry() {
        let store = seeded();
        store.insert_raw(C, "R1/Output/Z", "[]");
        let config = ConsolidationConfig::strict();
        let err = ConsolidationStage::new(&store, &config)
            .run(trigger(), &keys(&["R1/Input/A"], &["R1/Output/C", "R1/Output/Z"]))
            .await
            .unwrap_err();

        match err {
            ConsolidationError::CorruptEntry { key, .. } => assert_eq!(key, "R1/Output/Z"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_text_entry_follows_corrupt_entry_policy() {
        let dir = tempfile::tempdir().unwrap();
        let store = lineage_store::FsObjectStore::new(dir.path());
        for (key, name) in [("R1/Input/A", "a"), ("R1/Output/C", "c")] {
            let payload = Dataset::new(name, "ns").to_canonical_json().unwrap();
            store.write_if_absent(C, key, payload).await.unwrap();
        }
        let planted = dir.path().join(C).join("R1").join("Input").join("0000");
        std::fs::write(&planted, [0xff, 0xfe, 0x00]).unwrap();
        let discovered = keys(&["R1/Input/0000", "R1/Input/A"], &["R1/Output/C"]);

        let config = ConsolidationConfig::default();
        let (outcome, report) = ConsolidationStage::new(&store, &config)
            .run(trigger(), &discovered)
            .await
            .unwrap();
        assert_eq!(outcome.into_record().unwrap().inputs, vec![Dataset::new("a", "ns")]);
        assert_eq!(report.unwrap().dropped_inputs, 1);

        let strict = ConsolidationConfig::strict();
        let err = ConsolidationStage::new(&store, &strict)
            .run(trigger(), &discovered)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsolidationError::CorruptEntry { ref key, .. } if key == "R1/Input/0000"));
    }

    #[tokio::test]
    async fn vanished_entry_is_a_store_error() {
        let store = seeded();
        let config = ConsolidationConfig::default();
        let err = ConsolidationStage::new(&store, &config)
            .run(trigger(), &keys(&["R1/Input/GONE"], &["R1/Output/C"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ConsolidationError::Store(_)));
    }

    #[tokio::test]
    async fn keeps_unrelated_event_members() {
        let store = seeded();
        let config = ConsolidationConfig::default();
        let mut event = trigger();
        event.event_type = Some("COMPLETE".into());
        event.job.name = "nb_R1.cell".into();

        let (outcome, _) = ConsolidationStage::new(&store, &config)
            .run(event, &keys(&["R1/Input/A"], &["R1/Output/C"]))
            .await
            .unwrap();
        let merged = outcome.into_record().unwrap();
        assert_eq!(merged.event_type.as_deref(), Some("COMPLETE"));
        assert_eq!(merged.job.name, "nb_R1.cell");
    }
}

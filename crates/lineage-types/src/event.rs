use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dataset::{Dataset, DatasetSide};
use crate::error::TypeError;

/// The `run` member of a lineage event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    #[serde(rename = "runId", default)]
    pub run_id: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub facets: Map<String, Value>,
}

/// The `job` member of a lineage event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobInfo {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub facets: Map<String, Value>,
}

/// A lineage run event, as delivered by a producer.
///
/// A single delivery usually reports only part of a run: some inputs in one
/// event, some outputs in another. Members the engine does not interpret are
/// kept in `extra` and written back out unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    #[serde(default)]
    pub run: RunInfo,
    #[serde(default)]
    pub job: JobInfo,
    #[serde(default)]
    pub inputs: Vec<Dataset>,
    #[serde(default)]
    pub outputs: Vec<Dataset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(
        rename = "schemaURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub schema_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LineageEvent {
    pub fn from_json(json: &str) -> Result<Self, TypeError> {
        serde_json::from_str(json).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, TypeError> {
        serde_json::to_string(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Datasets observed on one side of the run.
    pub fn datasets(&self, side: DatasetSide) -> &[Dataset] {
        match side {
            DatasetSide::Input => &self.inputs,
            DatasetSide::Output => &self.outputs,
        }
    }

    /// Every dataset in the event, tagged with its side, inputs first.
    pub fn tagged_datasets(&self) -> impl Iterator<Item = (DatasetSide, &Dataset)> {
        self.inputs
            .iter()
            .map(|d| (DatasetSide::Input, d))
            .chain(self.outputs.iter().map(|d| (DatasetSide::Output, d)))
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;

/// Which side of a run a dataset was observed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DatasetSide {
    /// Read by the run.
    Input,
    /// Written by the run.
    Output,
}

impl DatasetSide {
    /// Both sides, inputs first.
    pub const ALL: [DatasetSide; 2] = [DatasetSide::Input, DatasetSide::Output];

    /// Path segment used in storage keys.
    pub fn as_segment(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Output => "Output",
        }
    }
}

impl fmt::Display for DatasetSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_segment())
    }
}

/// Borrowed `{name, namespace}` pair identifying a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DatasetRef<'a> {
    pub name: &'a str,
    pub namespace: &'a str,
}

impl fmt::Display for DatasetRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// An input or output dataset record as carried by a lineage event.
///
/// Only `name` and `namespace` are interpreted. Every other member (facets,
/// input/output facets, vendor extensions) is kept verbatim in `extra` and
/// survives a serialize/store/deserialize cycle unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub namespace: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            extra: Map::new(),
        }
    }

    /// Attach an additional member, e.g. `"facets"`.
    pub fn with_member(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn reference(&self) -> DatasetRef<'_> {
        DatasetRef {
            name: &self.name,
            namespace: &self.namespace,
        }
    }

    /// Canonical JSON form.
    ///
    /// `name` and `namespace` come first, then the remaining members in key
    /// order, so equal records always serialize to identical bytes.
    pub fn to_canonical_json(&self) -> Result<String, TypeError> {
        serde_json::to_string(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Decode a stored record.
    ///
    /// Returns `Ok(None)` for a JSON `null` payload.
    pub fn from_stored_json(payload: &str) -> Result<Option<Self>, TypeError> {
        serde_json::from_str::<Option<Self>>(payload)
            .map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

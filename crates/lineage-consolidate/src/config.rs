use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConsolidationError, Result};

/// Container that holds accumulated run state unless configured otherwise.
pub const DEFAULT_CONTAINER: &str = "ol-synapsemessages";

/// What to do with an accumulated entry that cannot be decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptEntryPolicy {
    /// Log it and leave it out of the merged record.
    #[default]
    Drop,
    /// Abort consolidation with [`ConsolidationError::CorruptEntry`].
    Fail,
}

/// Configuration for the consolidation engine.
///
/// Every field has a default, so an empty TOML document is valid:
///
/// ```toml
/// container = "ol-synapsemessages"
/// max_concurrency = 16
/// corrupt_entries = "drop"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Store container holding `{runId}/Input/` and `{runId}/Output/` keys.
    pub container: String,
    /// Upper bound on store calls in flight per stage.
    pub max_concurrency: usize,
    /// Handling of accumulated entries that fail to decode.
    pub corrupt_entries: CorruptEntryPolicy,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            container: DEFAULT_CONTAINER.to_string(),
            max_concurrency: 16,
            corrupt_entries: CorruptEntryPolicy::Drop,
        }
    }
}

impl ConsolidationConfig {
    /// Defaults, except corrupt entries abort consolidation.
    pub fn strict() -> Self {
        Self {
            corrupt_entries: CorruptEntryPolicy::Fail,
            ..Default::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ConsolidationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConsolidationError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.container.trim().is_empty() {
            return Err(ConsolidationError::Config(
                "container must not be empty".into(),
            ));
        }
        if self.container.contains('/') {
            return Err(ConsolidationError::Config(
                "container must not contain '/'".into(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(ConsolidationError::Config(
                "max_concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

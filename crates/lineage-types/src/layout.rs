//! Storage key layout for accumulated run state.
//!
//! ```text
//! {runId}/Input/{contentKey}
//! {runId}/Output/{contentKey}
//! ```

use crate::dataset::DatasetSide;
use crate::key::ContentKey;
use crate::run::RunId;

/// Prefix under which every dataset of one side of a run is stored.
pub fn side_prefix(run: &RunId, side: DatasetSide) -> String {
    format!("{}/{}/", run.as_str(), side.as_segment())
}

/// Full storage key for one dataset of a run.
pub fn dataset_key(run: &RunId, side: DatasetSide, key: &ContentKey) -> String {
    format!("{}{}", side_prefix(run, side), key.to_hex())
}

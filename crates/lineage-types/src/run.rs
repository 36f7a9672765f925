use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::event::LineageEvent;

/// Identifier grouping every partial delivery of one logical run.
///
/// Run identifiers are opaque and supplied by the caller. They become the
/// leading segment of every storage key for the run, so they must be
/// non-blank and must not contain `/`: a slash would let one run's prefix
/// nest inside another's (run `a/Input` would live under run `a`'s inputs).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RunId(String);

impl RunId {
    /// Validate and wrap a run identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(TypeError::invalid_run_id(value, "must not be blank"));
        }
        if value.contains('/') {
            return Err(TypeError::invalid_run_id(value, "must not contain '/'"));
        }
        Ok(Self(value))
    }

    /// Take the run identifier carried in the event's `run.runId` member.
    pub fn from_event(event: &LineageEvent) -> Result<Self, TypeError> {
        Self::new(event.run.run_id.clone())
    }

    /// Extract the run identifier embedded in a notebook job name.
    ///
    /// Spark notebook jobs are named `<notebook>_<pool>_<runId>.<suffix>`;
    /// the identifier is the last `_`-separated segment before the first `.`.
    pub fn from_job_name(job_name: &str) -> Result<Self, TypeError> {
        let stem = job_name.split('.').next().unwrap_or_default();
        let segment = stem.rsplit('_').next().unwrap_or_default();
        if segment.trim().is_empty() {
            return Err(TypeError::invalid_run_id(
                job_name,
                "job name carries no run segment",
            ));
        }
        Self::new(segment)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RunId({})", self.0)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RunId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RunId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for RunId {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RunId> for String {
    fn from(id: RunId) -> Self {
        id.0
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ObjectStore, WriteOutcome};

/// Snapshot of the calls an [`InMemoryObjectStore`] has served.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub exists: u64,
    /// `write_if_absent` calls, including ones that found the key taken.
    pub write_attempts: u64,
    /// `write_if_absent` calls that actually stored a payload.
    pub writes: u64,
    pub reads: u64,
    pub lists: u64,
}

#[derive(Default)]
struct Counters {
    exists: AtomicU64,
    write_attempts: AtomicU64,
    writes: AtomicU64,
    reads: AtomicU64,
    lists: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> OpCounts {
        OpCounts {
            exists: self.exists.load(Ordering::Relaxed),
            write_attempts: self.write_attempts.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            lists: self.lists.load(Ordering::Relaxed),
        }
    }
}

type ObjectKey = (String, String);

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Objects are held behind a `RwLock` and
/// write-if-absent is a single locked insert, so concurrent writers of one
/// key always leave exactly one value behind.
///
/// Failures can be injected per key prefix to exercise error propagation;
/// an injected failure surfaces as [`StoreError::Unavailable`].
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectKey, String>>,
    fail_prefixes: RwLock<Vec<String>>,
    counters: Counters,
    latency: Option<Duration>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that sleeps for `latency` before serving each call.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Number of objects currently stored, across containers.
    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted keys stored in `container`.
    pub fn keys(&self, container: &str) -> Vec<String> {
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = map
            .keys()
            .filter(|(c, _)| c == container)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Peek at a payload without counting it as a read.
    pub fn get(&self, container: &str, key: &str) -> Option<String> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(container.to_string(), key.to_string()))
            .cloned()
    }

    /// Store a payload unconditionally, bypassing write-if-absent.
    ///
    /// Used to plant damaged payloads in tests.
    pub fn insert_raw(&self, container: &str, key: &str, payload: impl Into<String>) {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((container.to_string(), key.to_string()), payload.into());
    }

    /// Fail every call whose key (or listing prefix) starts with `prefix`.
    pub fn inject_failure(&self, prefix: impl Into<String>) {
        self.fail_prefixes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prefix.into());
    }

    /// Clears all injected failures.
    pub fn clear_failures(&self) {
        self.fail_prefixes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Calls served so far.
    pub fn op_counts(&self) -> OpCounts {
        self.counters.snapshot()
    }

    async fn enter(&self, key: &str) -> StoreResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let fail_prefixes = self
            .fail_prefixes
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if fail_prefixes.iter().any(|p| key.starts_with(p.as_str())) {
            return Err(StoreError::Unavailable(format!(
                "injected failure for {key}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn exists(&self, container: &str, key: &str) -> StoreResult<bool> {
        Counters::bump(&self.counters.exists);
        self.enter(key).await?;
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.contains_key(&(container.to_string(), key.to_string())))
    }

    async fn write_if_absent(
        &self,
        container: &str,
        key: &str,
        payload: String,
    ) -> StoreResult<WriteOutcome> {
        Counters::bump(&self.counters.write_attempts);
        self.enter(key).await?;
        let mut map = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        match map.entry((container.to_string(), key.to_string())) {
            std::collections::hash_map::Entry::Occupied(_) => Ok(WriteOutcome::AlreadyPresent),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(payload);
                Counters::bump(&self.counters.writes);
                Ok(WriteOutcome::Written)
            }
        }
    }

    async fn read(&self, container: &str, key: &str) -> StoreResult<String> {
        Counters::bump(&self.counters.reads);
        self.enter(key).await?;
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&(container.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::not_found(container, key))
    }

    async fn list_by_prefix(&self, container: &str, prefix: &str) -> StoreResult<Vec<String>> {
        Counters::bump(&self.counters.lists);
        self.enter(prefix).await?;
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map
            .keys()
            .filter(|(c, k)| c == container && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .field("latency", &self.latency)
            .finish()
    }
}

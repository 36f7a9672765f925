use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreResult;

/// Result of a [`ObjectStore::write_if_absent`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The payload was stored.
    Written,
    /// An object already existed at the key; nothing was written.
    AlreadyPresent,
}

/// Durable key/blob store shared by every invocation of the engine.
///
/// All implementations must satisfy these invariants:
/// - Keys are `/`-delimited and scoped to a container.
/// - An existing key is never overwritten (write-if-absent).
/// - Concurrent calls are safe, including concurrent writers of one key.
/// - The store never interprets payloads.
/// - All backend errors are propagated, never silently ignored.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether an object is currently stored at `key`.
    async fn exists(&self, container: &str, key: &str) -> StoreResult<bool>;

    /// Store `payload` at `key` unless an object is already there.
    ///
    /// Losing a race to another writer is not an error; it reports
    /// [`WriteOutcome::AlreadyPresent`].
    async fn write_if_absent(
        &self,
        container: &str,
        key: &str,
        payload: String,
    ) -> StoreResult<WriteOutcome>;

    /// Read the payload stored at `key`.
    ///
    /// Returns `StoreError::NotFound` if the key is absent.
    async fn read(&self, container: &str, key: &str) -> StoreResult<String>;

    /// Every key currently stored under `prefix`, in no particular order.
    ///
    /// Returns an empty vec if nothing matches.
    async fn list_by_prefix(&self, container: &str, prefix: &str) -> StoreResult<Vec<String>>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    async fn exists(&self, container: &str, key: &str) -> StoreResult<bool> {
        (**self).exists(container, key).await
    }

    async fn write_if_absent(
        &self,
        container: &str,
        key: &str,
        payload: String,
    ) -> StoreResult<WriteOutcome> {
        (**self).write_if_absent(container, key, payload).await
    }

    async fn read(&self, container: &str, key: &str) -> StoreResult<String> {
        (**self).read(container, key).await
    }

    async fn list_by_prefix(&self, container: &str, prefix: &str) -> StoreResult<Vec<String>> {
        (**self).list_by_prefix(container, prefix).await
    }
}

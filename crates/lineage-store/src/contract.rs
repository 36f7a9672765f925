//! Behaviour every [`ObjectStore`] backend must show, run against each one.

use std::sync::Arc;

use crate::error::StoreError;
use crate::traits::{ObjectStore, WriteOutcome};

const C: &str = "contract";

async fn exists_reflects_writes<S: ObjectStore>(store: &S) {
    assert!(!store.exists(C, "R1/Input/A").await.unwrap());
    store
        .write_if_absent(C, "R1/Input/A", "payload".into())
        .await
        .unwrap();
    assert!(store.exists(C, "R1/Input/A").await.unwrap());
}

async fn never_overwrites<S: ObjectStore>(store: &S) {
    let first = store
        .write_if_absent(C, "R2/Input/A", "first".into())
        .await
        .unwrap();
    let second = store
        .write_if_absent(C, "R2/Input/A", "second".into())
        .await
        .unwrap();
    assert_eq!(first, WriteOutcome::Written);
    assert_eq!(second, WriteOutcome::AlreadyPresent);
    assert_eq!(store.read(C, "R2/Input/A").await.unwrap(), "first");
}

async fn missing_read_is_not_found<S: ObjectStore>(store: &S) {
    let err = store.read(C, "R3/Input/missing").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }), "got {err:?}");
}

async fn listing_is_scoped_to_prefix<S: ObjectStore>(store: &S) {
    for key in ["R4/Input/A", "R4/Input/B", "R4/Output/C", "R40/Input/D"] {
        store.write_if_absent(C, key, key.into()).await.unwrap();
    }
    let mut inputs = store.list_by_prefix(C, "R4/Input/").await.unwrap();
    inputs.sort();
    assert_eq!(inputs, vec!["R4/Input/A".to_string(), "R4/Input/B".to_string()]);

    let outputs = store.list_by_prefix(C, "R4/Output/").await.unwrap();
    assert_eq!(outputs, vec!["R4/Output/C".to_string()]);

    assert!(store.list_by_prefix(C, "R5/Input/").await.unwrap().is_empty());
}

async fn payload_round_trips_verbatim<S: ObjectStore>(store: &S) {
    let payload = r#"{"name":"/sales","namespace":"abfss://raw","facets":{"é":"ünïcødé"}}"#;
    store
        .write_if_absent(C, "R6/Output/A", payload.into())
        .await
        .unwrap();
    assert_eq!(store.read(C, "R6/Output/A").await.unwrap(), payload);
}

async fn concurrent_writers_leave_one_value<S: ObjectStore + 'static>(store: Arc<S>) {
    let writers = (0..16).map(|i| {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .write_if_absent(C, "R7/Input/A", format!("writer-{i}"))
                .await
        })
    });
    let mut written = 0;
    for handle in writers {
        if handle.await.unwrap().unwrap() == WriteOutcome::Written {
            written += 1;
        }
    }
    assert_eq!(written, 1);
    assert!(store.read(C, "R7/Input/A").await.unwrap().starts_with("writer-"));
    assert_eq!(store.list_by_prefix(C, "R7/").await.unwrap().len(), 1);
}

async fn run_contract<S: ObjectStore + 'static>(store: Arc<S>) {
    exists_reflects_writes(&*store).await;
    never_overwrites(&*store).await;
    missing_read_is_not_found(&*store).await;
    listing_is_scoped_to_prefix(&*store).await;
    payload_round_trips_verbatim(&*store).await;
    concurrent_writers_leave_one_value(store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_memory_store_satisfies_contract() {
    run_contract(Arc::new(crate::InMemoryObjectStore::new())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fs_store_satisfies_contract() {
    let dir = tempfile::tempdir().unwrap();
    run_contract(Arc::new(crate::FsObjectStore::new(dir.path()))).await;
}

#[tokio::test]
async fn arc_wrapped_store_delegates() {
    let inner = Arc::new(crate::InMemoryObjectStore::new());
    let shared: Arc<dyn ObjectStore> = inner.clone();
    run_contract(Arc::new(shared)).await;
    assert!(!inner.is_empty());
}

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ObjectStore, WriteOutcome};

/// Prefix of in-flight temp files; never reported by listings.
const TEMP_PREFIX: &str = ".tmp-";

/// Directory-backed object store.
///
/// Each container is a subdirectory of the root and each `/`-delimited key
/// segment is a path component:
///
/// ```text
/// <root>/<container>/R1/Input/3A7F...
/// ```
///
/// Writes go to a temp file in the destination directory which is then
/// linked into place with no-clobber semantics, so a reader never sees a
/// partially written payload and an existing object is never replaced.
#[derive(Clone, Debug)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_dir(&self, container: &str) -> StoreResult<PathBuf> {
        check_segment(container, container)?;
        Ok(self.root.join(container))
    }

    fn object_path(&self, container: &str, key: &str) -> StoreResult<PathBuf> {
        let mut path = self.container_dir(container)?;
        for segment in key.split('/') {
            check_segment(key, segment)?;
            path.push(segment);
        }
        Ok(path)
    }
}

fn check_segment(key: &str, segment: &str) -> StoreResult<()> {
    if segment.is_empty() {
        return Err(StoreError::invalid_key(key, "empty path segment"));
    }
    if segment == "." || segment == ".." {
        return Err(StoreError::invalid_key(key, "relative path segment"));
    }
    if segment.starts_with(TEMP_PREFIX) {
        return Err(StoreError::invalid_key(key, "reserved temp-file prefix"));
    }
    if segment.contains('\\') {
        return Err(StoreError::invalid_key(key, "backslash in segment"));
    }
    Ok(())
}

async fn blocking<T, F>(f: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> StoreResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Internal(format!("blocking task failed: {e}")))?
}

fn persist_no_clobber(path: &Path, payload: &[u8]) -> StoreResult<WriteOutcome> {
    let dir = path
        .parent()
        .ok_or_else(|| StoreError::invalid_key(path.display().to_string(), "no parent"))?;
    std::fs::create_dir_all(dir)?;

    let mut temp = tempfile::Builder::new().prefix(TEMP_PREFIX).tempfile_in(dir)?;
    temp.write_all(payload)?;
    temp.as_file().sync_all()?;

    match temp.persist_noclobber(path) {
        Ok(_) => Ok(WriteOutcome::Written),
        // The temp file is removed when the returned handle drops.
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(WriteOutcome::AlreadyPresent),
        Err(e) => Err(StoreError::Io(e.error)),
    }
}

/// Directory holding every key under `prefix`: the container directory
/// joined with the prefix's complete `/` segments.
fn listing_root(container_dir: &Path, prefix: &str) -> StoreResult<PathBuf> {
    let mut dir = container_dir.to_path_buf();
    if let Some((complete, _partial)) = prefix.rsplit_once('/') {
        for segment in complete.split('/') {
            check_segment(prefix, segment)?;
            dir.push(segment);
        }
    }
    Ok(dir)
}

fn walk_keys(container_dir: &Path, start: &Path, prefix: &str) -> StoreResult<Vec<String>> {
    let mut keys = Vec::new();
    for entry in WalkDir::new(start).min_depth(1) {
        let entry = entry.map_err(|e| StoreError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(TEMP_PREFIX))
        {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(container_dir) else {
            continue;
        };
        let segments: Option<Vec<&str>> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect();
        let Some(segments) = segments else {
            continue;
        };
        let key = segments.join("/");
        if key.starts_with(prefix) {
            keys.push(key);
        }
    }
    Ok(keys)
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn exists(&self, container: &str, key: &str) -> StoreResult<bool> {
        let path = self.object_path(container, key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn write_if_absent(
        &self,
        container: &str,
        key: &str,
        payload: String,
    ) -> StoreResult<WriteOutcome> {
        let path = self.object_path(container, key)?;
        let outcome = blocking(move || persist_no_clobber(&path, payload.as_bytes())).await?;
        debug!(container, key, ?outcome, "fs write-if-absent");
        Ok(outcome)
    }

    async fn read(&self, container: &str, key: &str) -> StoreResult<String> {
        let path = self.object_path(container, key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::not_found(container, key))
            }
            Err(e) => return Err(e.into()),
        };
        String::from_utf8(bytes).map_err(|_| StoreError::InvalidPayload {
            key: key.to_string(),
        })
    }

    async fn list_by_prefix(&self, container: &str, prefix: &str) -> StoreResult<Vec<String>> {
        let container_dir = self.container_dir(container)?;
        let start = listing_root(&container_dir, prefix)?;
        if !tokio::fs::try_exists(&start).await? {
            return Ok(Vec::new());
        }
        let prefix = prefix.to_string();
        blocking(move || walk_keys(&container_dir, &start, &prefix)).await
    }
}

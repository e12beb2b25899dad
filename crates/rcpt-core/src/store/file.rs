//! File-backed key-value store: one JSON file per key.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tracing::debug;

use super::{KeyLock, KeyValueStore};
use crate::error::StorageError;

/// Key-value store keeping `<dir>/<key>.json` files.
///
/// Writes go to a uniquely named temporary file first and are renamed into
/// place, so a reader never sees a half-written value. [`KeyValueStore::lock`]
/// takes an advisory lock on `<dir>/<key>.lock`, which excludes writers in
/// other processes as well.
#[derive(Debug, Clone)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::Write {
                key: key.to_string(),
                reason: "invalid key".to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

/// Exclusive advisory lock on a `.lock` file; unlocked when dropped.
struct FileLock {
    file: File,
}

impl KeyLock for FileLock {}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn write_atomic(dir: &Path, target: &Path, prefix: &str, value: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(value)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

fn lock_exclusive(dir: &Path, path: &Path) -> std::io::Result<File> {
    std::fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)?;
    file.lock_exclusive()?;
    Ok(file)
}

#[async_trait]
impl KeyValueStore for FileKv {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let write_err = |e: std::io::Error| StorageError::Write {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let dir = self.dir.clone();
        let target = path.clone();
        let prefix = format!(".{}.", key);
        let len = value.len();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &target, &prefix, value.as_bytes()))
            .await
            .map_err(|e| write_err(std::io::Error::other(e)))?
            .map_err(write_err)?;

        debug!("Wrote {} bytes to {}", len, path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Write {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn lock(&self, key: &str) -> Result<Box<dyn KeyLock>, StorageError> {
        self.path_for(key)?;
        let lock_err = |e: std::io::Error| StorageError::Write {
            key: key.to_string(),
            reason: format!("failed to lock: {}", e),
        };

        let dir = self.dir.clone();
        let path = self.dir.join(format!("{}.lock", key));
        let file = tokio::task::spawn_blocking(move || lock_exclusive(&dir, &path))
            .await
            .map_err(|e| lock_err(std::io::Error::other(e)))?
            .map_err(lock_err)?;

        Ok(Box::new(FileLock { file }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKv::new(dir.path().join("nested"));

        assert_eq!(kv.get("expenses").await.unwrap(), None);
        kv.set("expenses", "[]".into()).await.unwrap();

        kv.set("expenses", "[1]".into()).await.unwrap();

        assert_eq!(kv.get("expenses").await.unwrap().as_deref(), Some("[1]"));
        assert!(dir.path().join("nested/expenses.json").exists());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        kv.remove("expenses").await.unwrap();
        kv.remove("expenses").await.unwrap();
        assert_eq!(kv.get("expenses").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKv::new(dir.path());

        assert!(kv.set("../escape", "x".into()).await.is_err());
        assert!(kv.get("a/b").await.is_err());
        assert!(kv.set("", "x".into()).await.is_err());
        assert!(kv.lock("../escape").await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_lock_excludes_other_handles() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileKv::new(dir.path());
        let second = FileKv::new(dir.path());

        let held = first.lock("expenses").await.unwrap();
        assert!(dir.path().join("expenses.lock").exists());

        let waiting = tokio::spawn(async move { second.lock("expenses").await.map(|_| ()) });
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(!waiting.is_finished());

        drop(held);
        waiting.await.unwrap().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let kv = std::sync::Arc::new(FileKv::new(dir.path()));

        let mut tasks = Vec::new();
        for i in 0..16 {
            let kv = kv.clone();
            tasks.push(tokio::spawn(async move { kv.set("expenses", format!("[{}]", i)).await }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let value = kv.get("expenses").await.unwrap().unwrap();
        assert!(value.starts_with('[') && value.ends_with(']'));
    }
}

//! Shared test helpers for resolver tests.

#![allow(dead_code)]

use async_trait::async_trait;
use otpsync_cache::{
    BaseVersion, CacheError, CacheResult, CachedStorage, OtpCacheSupervisor, RemoteLocation,
};
use otpsync_record::{OtpRecord, OtpRecordCodec};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

/// A write the resolver issued against the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteWrite {
    pub location: RemoteLocation,
    pub content: Vec<u8>,
    pub use_file_transaction: bool,
    pub base_version: BaseVersion,
}

/// In-memory caching layer. Remote files live in a map; local cache files
/// are real files so the returned handles can be read back.
#[derive(Default)]
pub struct MemoryStorage {
    remote: Mutex<HashMap<RemoteLocation, Vec<u8>>>,
    base_versions: Mutex<HashMap<RemoteLocation, BaseVersion>>,
    writes: Mutex<Vec<RemoteWrite>>,
    refreshes: Mutex<Vec<(RemoteLocation, PathBuf)>>,
    conflict_on_write: AtomicBool,
    fail_refresh: AtomicBool,
    fail_remote_read: AtomicBool,
    cache_rewrite_on_remote_read: Mutex<Option<(PathBuf, Vec<u8>)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores remote content and records a base version that predates it.
    pub fn put_remote(&self, location: &RemoteLocation, content: Vec<u8>) {
        self.base_versions.lock().unwrap().insert(
            location.clone(),
            BaseVersion::new(format!("base-of-{location}")),
        );
        self.remote.lock().unwrap().insert(location.clone(), content);
    }

    pub fn remote_content(&self, location: &RemoteLocation) -> Option<Vec<u8>> {
        self.remote.lock().unwrap().get(location).cloned()
    }

    pub fn writes(&self) -> Vec<RemoteWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn refreshes(&self) -> Vec<(RemoteLocation, PathBuf)> {
        self.refreshes.lock().unwrap().clone()
    }

    /// Makes every transactional write report an intervening remote change.
    pub fn inject_write_conflict(&self) {
        self.conflict_on_write.store(true, Ordering::SeqCst);
    }

    pub fn inject_refresh_failure(&self) {
        self.fail_refresh.store(true, Ordering::SeqCst);
    }

    pub fn inject_remote_read_failure(&self) {
        self.fail_remote_read.store(true, Ordering::SeqCst);
    }

    /// Overwrites a cache file while the remote copy is being read, as a
    /// writer racing the resolver would.
    pub fn rewrite_cache_during_remote_read(&self, cached_file: &Path, content: Vec<u8>) {
        *self.cache_rewrite_on_remote_read.lock().unwrap() =
            Some((cached_file.to_path_buf(), content));
    }

    fn read(&self, location: &RemoteLocation) -> CacheResult<Vec<u8>> {
        self.remote
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .ok_or_else(|| CacheError::Remote(format!("not found: {location}")))
    }
}

#[async_trait]
impl CachedStorage for MemoryStorage {
    async fn open_remote_read(&self, location: &RemoteLocation) -> CacheResult<Vec<u8>> {
        if self.fail_remote_read.load(Ordering::SeqCst) {
            return Err(CacheError::Remote("connection reset".to_string()));
        }
        let rewrite = self.cache_rewrite_on_remote_read.lock().unwrap().take();
        if let Some((path, content)) = rewrite {
            std::fs::write(path, content)?;
        }
        self.read(location)
    }

    async fn write_remote_transactional(
        &self,
        content: &[u8],
        location: &RemoteLocation,
        use_file_transaction: bool,
        base_version: &BaseVersion,
    ) -> CacheResult<()> {
        if self.conflict_on_write.load(Ordering::SeqCst) {
            return Err(CacheError::RemoteWriteConflict {
                location: location.clone(),
                base_version: base_version.clone(),
            });
        }
        self.writes.lock().unwrap().push(RemoteWrite {
            location: location.clone(),
            content: content.to_vec(),
            use_file_transaction,
            base_version: base_version.clone(),
        });
        self.remote
            .lock()
            .unwrap()
            .insert(location.clone(), content.to_vec());
        self.base_versions
            .lock()
            .unwrap()
            .insert(location.clone(), BaseVersion::of_content(content));
        Ok(())
    }

    async fn refresh_local_cache_from_remote(
        &self,
        location: &RemoteLocation,
        cached_file: &Path,
    ) -> CacheResult<()> {
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(CacheError::Io(std::io::Error::other("disk full")));
        }
        let content = self.read(location)?;
        tokio::fs::write(cached_file, &content).await?;
        self.refreshes
            .lock()
            .unwrap()
            .push((location.clone(), cached_file.to_path_buf()));
        self.base_versions
            .lock()
            .unwrap()
            .insert(location.clone(), BaseVersion::of_content(&content));
        Ok(())
    }

    async fn base_version(&self, location: &RemoteLocation) -> CacheResult<BaseVersion> {
        self.base_versions
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .ok_or_else(|| CacheError::Remote(format!("no base version for {location}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    UsedRemote(RemoteLocation),
    UsedLocal(RemoteLocation),
}

/// Supervisor that remembers every notification.
#[derive(Default)]
pub struct RecordingSupervisor {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl OtpCacheSupervisor for RecordingSupervisor {
    fn resolved_by_using_remote(&self, location: &RemoteLocation) {
        self.notifications
            .lock()
            .unwrap()
            .push(Notification::UsedRemote(location.clone()));
    }

    fn resolved_by_using_local(&self, location: &RemoteLocation) {
        self.notifications
            .lock()
            .unwrap()
            .push(Notification::UsedLocal(location.clone()));
    }
}

/// Encodes a record with a marker field so the two copies differ even when
/// their counters are equal.
pub fn record_bytes(counter: u64, origin: &str) -> Vec<u8> {
    let record = OtpRecord::new(counter)
        .with_field("Type", "HOTP")
        .with_field("Secret", "GEZDGNBVGY3TQOJQ")
        .with_field("Origin", origin);
    OtpRecordCodec::encode(&record).unwrap()
}

/// Writes a cache file into a temp dir and returns its path.
pub fn write_cache_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

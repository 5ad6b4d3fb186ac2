//! Cached storage abstraction trait.
//!
//! The operations the resolver needs from the generic caching layer. The
//! layer owns both files, the base version bookkeeping, and the transport;
//! the resolver only decides which copy wins.

use crate::error::CacheResult;
use crate::location::{BaseVersion, RemoteLocation};
use async_trait::async_trait;
use std::path::Path;

/// Remote access and cache maintenance provided by the caching layer.
#[async_trait]
pub trait CachedStorage: Send + Sync {
    /// Reads the full content of the remote file.
    async fn open_remote_read(&self, location: &RemoteLocation) -> CacheResult<Vec<u8>>;

    /// Overwrites the remote file with `content`.
    ///
    /// Must fail with [`CacheError::RemoteWriteConflict`] when the backend
    /// sees that the remote file no longer matches `base_version`.
    ///
    /// [`CacheError::RemoteWriteConflict`]: crate::CacheError::RemoteWriteConflict
    async fn write_remote_transactional(
        &self,
        content: &[u8],
        location: &RemoteLocation,
        use_file_transaction: bool,
        base_version: &BaseVersion,
    ) -> CacheResult<()>;

    /// Replaces the cached file with the current remote content.
    async fn refresh_local_cache_from_remote(
        &self,
        location: &RemoteLocation,
        cached_file: &Path,
    ) -> CacheResult<()>;

    /// Returns the fingerprint recorded for the remote file at the last sync.
    async fn base_version(&self, location: &RemoteLocation) -> CacheResult<BaseVersion>;
}

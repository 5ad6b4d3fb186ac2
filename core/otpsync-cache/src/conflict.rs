//! Conflict resolution for OTP records.
//!
//! Resolution picks one whole copy; fields are never merged. The copy with
//! the strictly higher counter wins. On equal counters the remote copy
//! wins, so devices converge on what the backend holds. This can drop
//! local progress if counters collide after a reset, which is why ties are
//! logged at warn level.

use crate::config::ResolverConfig;
use crate::error::{CacheError, CacheResult};
use crate::location::RemoteLocation;
use crate::storage::CachedStorage;
use crate::supervisor::OtpCacheSupervisor;
use async_trait::async_trait;
use otpsync_record::{OtpRecord, OtpRecordCodec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File};
use tracing::{debug, info, warn};

/// Which copy of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The locally cached file.
    Local,
    /// The file on the remote backend.
    Remote,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Everything known about one conflict once both copies are decoded.
#[derive(Debug, Clone)]
pub struct ConflictContext {
    pub location: RemoteLocation,
    pub cached_file: PathBuf,
    pub local: OtpRecord,
    pub remote: OtpRecord,
    /// Cached file content as read for `local`; this is what gets uploaded
    /// when the local copy wins.
    pub local_bytes: Vec<u8>,
}

impl ConflictContext {
    /// Returns the copy that should survive.
    #[must_use]
    pub fn winner(&self) -> Side {
        if self.local.counter() > self.remote.counter() {
            Side::Local
        } else {
            Side::Remote
        }
    }

    /// Returns the winning record.
    #[must_use]
    pub fn winning_record(&self) -> &OtpRecord {
        match self.winner() {
            Side::Local => &self.local,
            Side::Remote => &self.remote,
        }
    }

    /// Both copies claim the same counter.
    #[must_use]
    pub fn is_tie(&self) -> bool {
        self.local.counter() == self.remote.counter()
    }
}

/// Outcome of a completed resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub location: RemoteLocation,
    pub winner: Side,
    /// Counter of the winning copy, now held by both sides.
    pub counter: u64,
}

/// The hook a caching layer calls when a cached file and its remote
/// counterpart both changed since the last sync.
///
/// Implementations must leave the cached file holding the content that
/// reads should be served from, and return a fresh handle to it.
#[async_trait]
pub trait ConflictStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn open_file_for_read_with_conflict(
        &self,
        location: &RemoteLocation,
        cached_file: &Path,
        config: &ResolverConfig,
    ) -> CacheResult<File>;
}

/// Counter-based conflict resolver for OTP records.
pub struct OtpConflictResolver {
    storage: Arc<dyn CachedStorage>,
    supervisor: Arc<dyn OtpCacheSupervisor>,
}

impl OtpConflictResolver {
    /// Creates a resolver over the given caching layer.
    pub fn new(storage: Arc<dyn CachedStorage>, supervisor: Arc<dyn OtpCacheSupervisor>) -> Self {
        Self {
            storage,
            supervisor,
        }
    }

    /// Reads and decodes both copies. Nothing is written.
    pub async fn load_context(
        &self,
        location: &RemoteLocation,
        cached_file: &Path,
    ) -> CacheResult<ConflictContext> {
        let local_bytes = fs::read(cached_file).await?;
        let local = OtpRecordCodec::decode(&local_bytes).map_err(|source| {
            CacheError::MalformedRecord {
                side: Side::Local,
                source,
            }
        })?;
        debug!(path = %cached_file.display(), counter = local.counter(), "decoded cached OTP record");

        let remote_bytes = self.storage.open_remote_read(location).await?;
        let remote = OtpRecordCodec::decode(&remote_bytes).map_err(|source| {
            CacheError::MalformedRecord {
                side: Side::Remote,
                source,
            }
        })?;
        debug!(%location, counter = remote.counter(), "decoded remote OTP record");

        Ok(ConflictContext {
            location: location.clone(),
            cached_file: cached_file.to_path_buf(),
            local,
            remote,
            local_bytes,
        })
    }

    /// Resolves one conflict and reports which copy won.
    ///
    /// Exactly one side is overwritten, then the supervisor is notified.
    /// A failed overwrite is returned as-is: there is no rollback and no
    /// notification.
    pub async fn resolve(
        &self,
        location: &RemoteLocation,
        cached_file: &Path,
        config: &ResolverConfig,
    ) -> CacheResult<Resolution> {
        let context = self.load_context(location, cached_file).await?;
        let winner = context.winner();
        let counter = context.winning_record().counter();

        match winner {
            Side::Local => {
                info!(
                    %location,
                    local = context.local.counter(),
                    remote = context.remote.counter(),
                    "cached OTP record is newer, overwriting remote"
                );
                let base_version = self.storage.base_version(location).await?;
                self.storage
                    .write_remote_transactional(
                        &context.local_bytes,
                        location,
                        config.use_file_transactions,
                        &base_version,
                    )
                    .await?;
                self.supervisor.resolved_by_using_local(location);
            }
            Side::Remote => {
                if context.is_tie() {
                    warn!(
                        %location,
                        counter,
                        "OTP counters are equal, keeping remote copy"
                    );
                } else {
                    info!(
                        %location,
                        local = context.local.counter(),
                        remote = context.remote.counter(),
                        "remote OTP record is newer, refreshing cache"
                    );
                }
                self.storage
                    .refresh_local_cache_from_remote(location, cached_file)
                    .await?;
                self.supervisor.resolved_by_using_remote(location);
            }
        }

        Ok(Resolution {
            location: location.clone(),
            winner,
            counter,
        })
    }

    /// Resolves one conflict and opens the cached file, which now holds
    /// the winning content.
    pub async fn resolve_conflict(
        &self,
        location: &RemoteLocation,
        cached_file: &Path,
        config: &ResolverConfig,
    ) -> CacheResult<File> {
        self.resolve(location, cached_file, config).await?;
        Ok(File::open(cached_file).await?)
    }
}

#[async_trait]
impl ConflictStrategy for OtpConflictResolver {
    fn name(&self) -> &'static str {
        "otp-counter"
    }

    async fn open_file_for_read_with_conflict(
        &self,
        location: &RemoteLocation,
        cached_file: &Path,
        config: &ResolverConfig,
    ) -> CacheResult<File> {
        self.resolve_conflict(location, cached_file, config).await
    }
}

//! Conflict resolution for cached OTP auxiliary files.
//!
//! A generic caching layer keeps a local copy of each remote file and
//! serves reads from it. When both the cached copy and the remote file
//! changed since the last sync, the layer hands the conflict to a
//! [`ConflictStrategy`]. For OTP records the strategy is
//! [`OtpConflictResolver`]: the copy with the higher counter wins, the
//! other side is overwritten, and an [`OtpCacheSupervisor`] is told which
//! way it went.
//!
//! ## Components
//!
//! - **Storage**: [`CachedStorage`], the cache layer's remote read,
//!   transactional write and refresh operations
//! - **Supervisor**: [`OtpCacheSupervisor`], notified once per resolution
//! - **Config**: [`ResolverConfig`], preferences passed at call time
//! - **Resolver**: [`OtpConflictResolver`], the counter-based policy
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use otpsync_cache::{
//!     CachedStorage, OtpConflictResolver, RemoteLocation, ResolverConfig, TracingSupervisor,
//! };
//!
//! # async fn run(storage: Arc<dyn CachedStorage>) -> otpsync_cache::CacheResult<()> {
//! let resolver = OtpConflictResolver::new(storage, Arc::new(TracingSupervisor));
//! let location = RemoteLocation::new("webdav://example.org/keys/db.otp");
//!
//! let _file = resolver
//!     .resolve_conflict(&location, Path::new("/cache/db.otp"), &ResolverConfig::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod conflict;
mod error;
mod location;
mod storage;
mod supervisor;

pub use config::ResolverConfig;
pub use conflict::{ConflictContext, ConflictStrategy, OtpConflictResolver, Resolution, Side};
pub use error::{CacheError, CacheResult};
pub use location::{BaseVersion, RemoteLocation};
pub use storage::CachedStorage;
pub use supervisor::{OtpCacheSupervisor, TracingSupervisor};

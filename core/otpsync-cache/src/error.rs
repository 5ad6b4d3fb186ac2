//! Error types for conflict resolution.

use crate::conflict::Side;
use crate::location::{BaseVersion, RemoteLocation};
use otpsync_record::RecordError;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that abort a conflict resolution.
///
/// None of these are retried here; the caller decides whether to retry,
/// tell the user, or leave the resource unsynced.
#[derive(Debug, Error)]
pub enum CacheError {
    /// One of the two copies is not a valid OTP record.
    #[error("malformed {side} OTP record: {source}")]
    MalformedRecord {
        side: Side,
        #[source]
        source: RecordError,
    },

    /// The remote file changed again after its base version was captured.
    #[error("remote file {location} changed since base version {base_version}")]
    RemoteWriteConflict {
        location: RemoteLocation,
        base_version: BaseVersion,
    },

    /// Local disk error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote transport error.
    #[error("remote storage error: {0}")]
    Remote(String),

    /// Preferences could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

//! Remote resource identifiers and base version fingerprints.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Identifies a remote file (URL or backend-specific path).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteLocation(String);

impl RemoteLocation {
    /// Creates a location from its string form.
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemoteLocation {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RemoteLocation {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque token for the remote file's state at the last sync.
///
/// The cache layer decides what goes in it (content hash, ETag, revision
/// id). The resolver only hands it back on write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseVersion(String);

impl BaseVersion {
    /// Wraps a backend-provided token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// SHA-256 fingerprint of file content, hex encoded.
    #[must_use]
    pub fn of_content(content: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(content)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

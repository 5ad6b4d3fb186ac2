//! Resolver preferences.

use crate::error::CacheResult;
use serde::{Deserialize, Serialize};

/// Preferences that influence how a conflict is repaired.
///
/// Passed to every resolution call instead of being looked up globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Ask the backend to write the remote file inside a file transaction
    /// (write to a temporary name, then rename).
    pub use_file_transactions: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            use_file_transactions: true,
        }
    }
}

impl ResolverConfig {
    /// Loads the preferences from a JSON object. Missing keys keep their
    /// defaults.
    pub fn from_json(json: &str) -> CacheResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

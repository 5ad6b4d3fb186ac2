//! Resolution outcome notifications.

use crate::location::RemoteLocation;
use tracing::info;

/// Receives the outcome of each resolved conflict.
///
/// Exactly one method is called per successful resolution, after the
/// losing copy has been overwritten. Failed resolutions call neither.
pub trait OtpCacheSupervisor: Send + Sync {
    /// The remote file won; the cached copy was replaced.
    fn resolved_by_using_remote(&self, location: &RemoteLocation);

    /// The cached file won; the remote copy was replaced.
    fn resolved_by_using_local(&self, location: &RemoteLocation);
}

/// Supervisor that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSupervisor;

impl OtpCacheSupervisor for TracingSupervisor {
    fn resolved_by_using_remote(&self, location: &RemoteLocation) {
        info!(%location, "OTP cache conflict resolved using remote file");
    }

    fn resolved_by_using_local(&self, location: &RemoteLocation) {
        info!(%location, "OTP cache conflict resolved using local file");
    }
}

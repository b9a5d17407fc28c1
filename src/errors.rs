//! Topology Synchronization Error Hierarchy
//!
//! Errors reported by the coordination-service collaborator are kept apart
//! from the errors this crate surfaces to its callers. Only the initial
//! `listen()` setup and explicit `refresh()` calls ever return them; the
//! background loop logs and swallows everything it encounters.

use config::ConfigError;
use tokio::task::JoinError;

use crate::WatchStream;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Coordination service could not be reached while connecting
    #[error("Failed to connect to coordination service: {0}")]
    Connection(#[source] CoordinationError),

    /// A read of one of the watched documents failed
    #[error("Read of {stream} failed: {source}")]
    WatchRead {
        stream: WatchStream,
        #[source]
        source: CoordinationError,
    },

    /// Configuration source could not be loaded or deserialized
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration loaded but violates a constraint
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Background synchronization task panicked or was aborted
    #[error("Background sync task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

/// Failures reported by a [`CoordinationClient`](crate::CoordinationClient)
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinationError {
    /// Service endpoint unreachable
    #[error("Coordination service unreachable: {0}")]
    Unreachable(String),

    /// Session was expired by the service; watches registered on it are gone
    #[error("Coordination session expired")]
    SessionExpired,

    /// Watched document does not exist
    #[error("No node at {0}")]
    NoNode(String),

    /// Client was closed, or dropped a pending watch without firing it
    #[error("Coordination client closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn watch_read(
        stream: WatchStream,
        source: CoordinationError,
    ) -> Self {
        Error::WatchRead { stream, source }
    }
}

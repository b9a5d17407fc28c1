//! Coordination-service collaborator.
//!
//! The crate does not talk to the coordination service itself. Anything that
//! can connect, read the cluster-state document and the live-node list, and
//! register single-shot watches on both can drive a
//! [`TopologySync`](crate::TopologySync).

mod event;
pub use event::*;


use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::oneshot;

use crate::Collection;
use crate::CoordinationError;

/// Collection name → collection topology
pub type Collections = HashMap<String, Collection>;

/// Fires exactly once when the watched data changes, then is spent.
pub type WatchReceiver = oneshot::Receiver<WatchEvent>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CoordinationClient: Send + Sync + 'static {
    /// Establish (or re-establish) the session
    async fn connect(&self) -> std::result::Result<(), CoordinationError>;

    /// Read collection metadata and its version, arming a watch on it
    async fn get_cluster_state_w(&self) -> std::result::Result<(Collections, i64, WatchReceiver), CoordinationError>;

    /// Read collection metadata and its version without a watch
    async fn get_cluster_state(&self) -> std::result::Result<(Collections, i64), CoordinationError>;

    /// Read the live-node list, arming a watch on it
    async fn get_live_nodes_w(&self) -> std::result::Result<(Vec<String>, WatchReceiver), CoordinationError>;

    /// Read the live-node list without a watch
    async fn get_live_nodes(&self) -> std::result::Result<Vec<String>, CoordinationError>;
}

/// Identifies one of the two watched documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchStream {
    Collections,
    LiveNodes,
}

impl WatchStream {
    /// Label used in logs and metrics
    pub fn as_str(self) -> &'static str {
        match self {
            WatchStream::Collections => "collections",
            WatchStream::LiveNodes => "live_nodes",
        }
    }

    /// Whether `event_type` means the data behind this stream changed
    pub fn is_relevant(
        self,
        event_type: EventType,
    ) -> bool {
        match self {
            WatchStream::Collections => event_type == EventType::NodeDataChanged,
            WatchStream::LiveNodes => {
                matches!(event_type, EventType::NodeDataChanged | EventType::NodeChildrenChanged)
            }
        }
    }
}

impl fmt::Display for WatchStream {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

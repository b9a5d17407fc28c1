use std::time::Duration;

use crate::SessionState;
use crate::WatchStream;

/// State transitions of a [`TopologySync`](crate::TopologySync), broadcast
/// to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Collections and version were overwritten in the cache
    CollectionsUpdated { version: i64 },

    /// Live-node list was overwritten in the cache
    LiveNodesUpdated { live_nodes: Vec<String> },

    /// A watch reported a session state below connected
    SessionDegraded { stream: WatchStream, state: SessionState },

    /// A read or watch of `stream` failed; the loop sleeps `delay` before retrying
    RefreshFailed {
        stream: WatchStream,
        consecutive_failures: u32,
        delay: Duration,
        error: String,
    },

    /// Background loop exited
    Stopped,
}

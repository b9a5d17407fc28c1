//! Last-known cluster topology shared between the synchronization loop and
//! any number of readers.


use parking_lot::RwLock;
use tracing::debug;
use tracing::info;

use crate::constants::DEFAULT_INSTANCE;
use crate::metrics::CLUSTER_STATE_VERSION;
use crate::metrics::LIVE_NODES;
use crate::ClusterState;
use crate::Collections;

/// Single-writer, many-reader holder of a [`ClusterState`].
///
/// Every accessor holds the lock only for one clone or one field overwrite.
/// Collections and live nodes are replaced independently: a reader may see
/// fresh collections next to a stale live-node list, but never a field that
/// is half-written.
#[derive(Debug)]
pub struct ClusterStateCache {
    /// `instance` label of the gauges this cache reports to
    instance: String,
    state: RwLock<ClusterState>,
}

impl Default for ClusterStateCache {
    fn default() -> Self {
        Self::with_instance(DEFAULT_INSTANCE)
    }
}

impl ClusterStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            state: RwLock::new(ClusterState::default()),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Independent copy of the current state
    pub fn snapshot(&self) -> ClusterState {
        self.state.read().clone()
    }

    pub(crate) fn reset(&self) {
        *self.state.write() = ClusterState::default();
        debug!("cluster state cache reset");
    }

    /// Overwrite collections and their version together.
    ///
    /// A version lower than the cached one is accepted as-is.
    pub(crate) fn set_collections(
        &self,
        collections: Collections,
        version: i64,
    ) {
        let mut state = self.state.write();
        state.collections = collections;
        state.version = version;
        CLUSTER_STATE_VERSION.with_label_values(&[self.instance.as_str()]).set(version);
        info!(version, collections = ?state.collections.keys().collect::<Vec<_>>(), "collections updated");
        debug!("collections: {:?}", state.collections);
    }

    pub(crate) fn set_live_nodes(
        &self,
        nodes: Vec<String>,
    ) {
        let mut state = self.state.write();
        state.live_nodes = nodes;
        LIVE_NODES
            .with_label_values(&[self.instance.as_str()])
            .set(state.live_nodes.len() as i64);
        info!(live_nodes = ?state.live_nodes, "live nodes updated");
    }
}

//! Cluster topology model.
//!
//! Mirrors the shape of the cluster-state document kept in the coordination
//! service, so a [`CoordinationClient`](crate::CoordinationClient)
//! implementation can deserialize it straight into [`Collection`]s.


use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::REPLICA_LEADER_FLAG;
use crate::constants::REPLICA_STATE_ACTIVE;
use crate::Collections;

/// Last-known view of the cluster.
///
/// Handed out by value: a reader's copy is never touched by the
/// synchronization loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterState {
    pub collections: Collections,
    pub live_nodes: Vec<String>,
    /// Version of the cluster-state document `collections` was read from
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(default)]
    pub shards: HashMap<String, Shard>,
    #[serde(default)]
    pub replication_factor: Option<String>,
    #[serde(default)]
    pub max_shards_per_node: Option<String>,
    #[serde(default)]
    pub router: Option<Router>,
    #[serde(default)]
    pub auto_add_replicas: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Router {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    /// Hash range covered by this shard, e.g. `80000000-ffffffff`
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub replicas: HashMap<String, Replica>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replica {
    pub core: String,
    pub base_url: String,
    pub node_name: String,
    pub state: String,
    /// Present and `"true"` only on the shard leader
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
}

impl Replica {
    pub fn is_leader(&self) -> bool {
        self.leader.as_deref() == Some(REPLICA_LEADER_FLAG)
    }

    pub fn is_active(&self) -> bool {
        self.state == REPLICA_STATE_ACTIVE
    }
}

impl ClusterState {
    pub fn collection(
        &self,
        name: &str,
    ) -> Option<&Collection> {
        self.collections.get(name)
    }

    pub fn is_live(
        &self,
        node_name: &str,
    ) -> bool {
        self.live_nodes.iter().any(|n| n == node_name)
    }

    /// Leader replica of `shard` in `collection`, if one is elected
    pub fn shard_leader(
        &self,
        collection: &str,
        shard: &str,
    ) -> Option<&Replica> {
        self.collection(collection)?
            .shards
            .get(shard)?
            .replicas
            .values()
            .find(|r| r.is_leader())
    }

    /// Active replicas of `collection` hosted on a live node.
    ///
    /// Ordered by shard name, then replica name.
    pub fn active_replicas(
        &self,
        collection: &str,
    ) -> Vec<&Replica> {
        let Some(collection) = self.collection(collection) else {
            return Vec::new();
        };

        let mut replicas: Vec<(&String, &String, &Replica)> = collection
            .shards
            .iter()
            .flat_map(|(shard_name, shard)| {
                shard
                    .replicas
                    .iter()
                    .map(move |(replica_name, replica)| (shard_name, replica_name, replica))
            })
            .filter(|(_, _, r)| r.is_active() && self.is_live(&r.node_name))
            .collect();
        replicas.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        replicas.into_iter().map(|(_, _, r)| r).collect()
    }
}

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::timeout;

use crate::Collection;
use crate::Replica;
use crate::Shard;
use crate::SyncConfig;
use crate::SyncEvent;

pub const EVENT_WAIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Two-shard collection with one active leader replica per shard
pub fn two_shard_collection(name: &str) -> Collection {
    let mut shards = HashMap::new();
    for (idx, node) in ["node1", "node2"].iter().enumerate() {
        let mut replicas = HashMap::new();
        replicas.insert(
            format!("core_node{}", idx + 1),
            Replica {
                core: format!("{name}_shard{}_replica1", idx + 1),
                base_url: format!("http://{node}:8983/solr"),
                node_name: format!("{node}:8983_solr"),
                state: "active".to_string(),
                leader: Some("true".to_string()),
            },
        );
        shards.insert(
            format!("shard{}", idx + 1),
            Shard {
                range: None,
                state: "active".to_string(),
                replicas,
            },
        );
    }

    Collection {
        shards,
        replication_factor: Some("1".to_string()),
        ..Default::default()
    }
}

pub fn test_sync_config() -> SyncConfig {
    SyncConfig::default()
}

/// Next event matching `pred`, skipping everything else
pub async fn wait_for_event<F>(
    rx: &mut broadcast::Receiver<SyncEvent>,
    pred: F,
) -> SyncEvent
where
    F: Fn(&SyncEvent) -> bool,
{
    timeout(EVENT_WAIT_TIMEOUT, async {
        loop {
            match rx.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => panic!("sync event channel closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for sync event")
}

/// Drains whatever is already queued without waiting
pub fn drain_events(rx: &mut broadcast::Receiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

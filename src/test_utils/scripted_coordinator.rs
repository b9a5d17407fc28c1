use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::Collection;
use crate::Collections;
use crate::CoordinationClient;
use crate::CoordinationError;
use crate::WatchEvent;
use crate::WatchReceiver;

#[derive(Default)]
struct Script {
    collections: Collections,
    version: i64,
    live_nodes: Vec<String>,

    // Remaining calls to fail
    connect_failures: usize,
    collections_failures: usize,
    live_nodes_failures: usize,
    // Remaining watching collection reads that never return
    collections_hangs: usize,

    // Armed watches; firing consumes them
    collections_watch: Option<oneshot::Sender<WatchEvent>>,
    live_nodes_watch: Option<oneshot::Sender<WatchEvent>>,

    connects: usize,
    collections_watch_reads: Vec<Instant>,
    live_nodes_watch_reads: Vec<Instant>,
    plain_reads: usize,
}

/// In-memory coordination service whose data, failures and watch firings
/// are driven by the test.
#[derive(Default)]
pub struct ScriptedCoordinator {
    script: Mutex<Script>,
}

impl ScriptedCoordinator {
    pub fn new(
        collections: Collections,
        version: i64,
        live_nodes: &[&str],
    ) -> Self {
        let coordinator = Self::default();
        coordinator.set_collections(collections, version);
        coordinator.set_live_nodes(live_nodes);
        coordinator
    }

    pub fn set_collections(
        &self,
        collections: Collections,
        version: i64,
    ) {
        let mut script = self.script.lock();
        script.collections = collections;
        script.version = version;
    }

    pub fn set_live_nodes(
        &self,
        live_nodes: &[&str],
    ) {
        self.script.lock().live_nodes = live_nodes.iter().map(|n| n.to_string()).collect();
    }

    pub fn fail_connects(
        &self,
        times: usize,
    ) {
        self.script.lock().connect_failures = times;
    }

    /// Next `times` collection reads (watching or not) fail
    pub fn fail_collections_reads(
        &self,
        times: usize,
    ) {
        self.script.lock().collections_failures = times;
    }

    pub fn fail_live_nodes_reads(
        &self,
        times: usize,
    ) {
        self.script.lock().live_nodes_failures = times;
    }

    /// Next `times` watching collection reads never complete
    pub fn hang_collections_reads(
        &self,
        times: usize,
    ) {
        self.script.lock().collections_hangs = times;
    }

    /// Fires the armed collections watch; false if none is armed
    pub fn fire_collections(
        &self,
        event: WatchEvent,
    ) -> bool {
        let sender = self.script.lock().collections_watch.take();
        sender.map(|tx| tx.send(event).is_ok()).unwrap_or(false)
    }

    pub fn fire_live_nodes(
        &self,
        event: WatchEvent,
    ) -> bool {
        let sender = self.script.lock().live_nodes_watch.take();
        sender.map(|tx| tx.send(event).is_ok()).unwrap_or(false)
    }

    /// Drops the armed collections watch without firing it
    pub fn drop_collections_watch(&self) {
        self.script.lock().collections_watch.take();
    }

    pub fn has_collections_watch(&self) -> bool {
        self.script.lock().collections_watch.is_some()
    }

    pub fn has_live_nodes_watch(&self) -> bool {
        self.script.lock().live_nodes_watch.is_some()
    }

    pub fn connects(&self) -> usize {
        self.script.lock().connects
    }

    /// Time of every `get_cluster_state_w` call, failed ones included
    pub fn collections_watch_reads(&self) -> Vec<Instant> {
        self.script.lock().collections_watch_reads.clone()
    }

    pub fn live_nodes_watch_reads(&self) -> Vec<Instant> {
        self.script.lock().live_nodes_watch_reads.clone()
    }

    pub fn plain_reads(&self) -> usize {
        self.script.lock().plain_reads
    }
}

fn take_failure(remaining: &mut usize) -> bool {
    if *remaining > 0 {
        *remaining -= 1;
        true
    } else {
        false
    }
}

#[async_trait]
impl CoordinationClient for ScriptedCoordinator {
    async fn connect(&self) -> Result<(), CoordinationError> {
        let mut script = self.script.lock();
        script.connects += 1;
        if take_failure(&mut script.connect_failures) {
            return Err(CoordinationError::Unreachable("127.0.0.1:2181".into()));
        }
        Ok(())
    }

    async fn get_cluster_state_w(&self) -> Result<(Collections, i64, WatchReceiver), CoordinationError> {
        let hang = {
            let mut script = self.script.lock();
            script.collections_watch_reads.push(Instant::now());
            take_failure(&mut script.collections_hangs)
        };
        if hang {
            std::future::pending::<()>().await;
        }

        let mut script = self.script.lock();
        if take_failure(&mut script.collections_failures) {
            return Err(CoordinationError::SessionExpired);
        }
        let (tx, rx) = oneshot::channel();
        script.collections_watch = Some(tx);
        Ok((script.collections.clone(), script.version, rx))
    }

    async fn get_cluster_state(&self) -> Result<(Collections, i64), CoordinationError> {
        let mut script = self.script.lock();
        script.plain_reads += 1;
        if take_failure(&mut script.collections_failures) {
            return Err(CoordinationError::SessionExpired);
        }
        Ok((script.collections.clone(), script.version))
    }

    async fn get_live_nodes_w(&self) -> Result<(Vec<String>, WatchReceiver), CoordinationError> {
        let mut script = self.script.lock();
        script.live_nodes_watch_reads.push(Instant::now());
        if take_failure(&mut script.live_nodes_failures) {
            return Err(CoordinationError::NoNode("/live_nodes".into()));
        }
        let (tx, rx) = oneshot::channel();
        script.live_nodes_watch = Some(tx);
        Ok((script.live_nodes.clone(), rx))
    }

    async fn get_live_nodes(&self) -> Result<Vec<String>, CoordinationError> {
        let mut script = self.script.lock();
        script.plain_reads += 1;
        if take_failure(&mut script.live_nodes_failures) {
            return Err(CoordinationError::NoNode("/live_nodes".into()));
        }
        Ok(script.live_nodes.clone())
    }
}

/// Collections map holding one empty collection per name
pub fn collections_named(names: &[&str]) -> Collections {
    names
        .iter()
        .map(|name| (name.to_string(), Collection::default()))
        .collect::<HashMap<_, _>>()
}

//! Topology synchronization engine.
//!
//! Keeps a [`ClusterStateCache`] in step with the coordination service:
//!
//! ```text
//! callers ──get_cluster_state()──▶ ClusterStateCache ◀──set_*── SyncLoop ◀──watch events── CoordinationClient
//! ```
//!
//! # Basic Usage
//! ```ignore
//! let sync = TopologySync::new(Arc::new(zk_client), TopologyConfig::new()?.validate()?.sync);
//! sync.listen().await?;
//!
//! let state = sync.get_cluster_state()?;
//! let replicas = state.active_replicas("products");
//! ```

mod events;
mod sync_loop;

pub use events::*;


use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing::info_span;
use tracing::warn;
use tracing::Instrument;

use self::sync_loop::apply_collections;
use self::sync_loop::apply_live_nodes;
use self::sync_loop::SyncLoop;
use crate::ClusterState;
use crate::ClusterStateCache;
use crate::CoordinationClient;
use crate::Error;
use crate::Result;
use crate::SyncConfig;
use crate::WatchReceiver;
use crate::WatchStream;

/// Running background loop and the token that stops it
struct SyncTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Client-side cache of the cluster topology, kept current through
/// coordination-service watches.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct TopologySync<C>
where
    C: CoordinationClient + ?Sized,
{
    client: Arc<C>,
    cache: Arc<ClusterStateCache>,
    config: SyncConfig,
    event_tx: broadcast::Sender<SyncEvent>,
    /// Serializes `listen()`/`stop()` so at most one loop runs
    task: Mutex<Option<SyncTask>>,
    listening: AtomicBool,
}

impl<C> TopologySync<C>
where
    C: CoordinationClient + ?Sized,
{
    pub fn new(
        client: Arc<C>,
        config: SyncConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_buffer);
        Self {
            client,
            cache: Arc::new(ClusterStateCache::with_instance(config.instance.clone())),
            config,
            event_tx,
            task: Mutex::new(None),
            listening: AtomicBool::new(false),
        }
    }

    /// Connects, registers both watches, and starts the background loop.
    ///
    /// Returns once the initial state is cached. Calling it again restarts
    /// synchronization from scratch: the running loop is stopped, the cache is
    /// emptied, and new watches are registered. After a failure the engine is
    /// left not listening and `listen()` may simply be retried.
    ///
    /// # Errors
    /// - [`Error::Connection`] if the coordination service is unreachable
    /// - [`Error::WatchRead`] if either initial watching read fails
    pub async fn listen(&self) -> Result<()> {
        let mut task = self.task.lock().await;

        if let Some(running) = task.take() {
            info!("restarting topology sync");
            Self::shutdown(running).await;
        }
        self.listening.store(false, Ordering::Release);

        self.client.connect().await.map_err(|e| {
            error!("connect to coordination service failed: {}", e);
            Error::Connection(e)
        })?;

        self.cache.reset();

        let collections_rx = self.init_collections_listener().await?;
        let live_nodes_rx = self.init_live_nodes_listener().await?;

        let token = CancellationToken::new();
        let sync_loop = SyncLoop::new(
            self.client.clone(),
            self.cache.clone(),
            &self.config,
            self.event_tx.clone(),
            token.clone(),
            collections_rx,
            live_nodes_rx,
        );
        let handle = tokio::spawn(sync_loop.run().instrument(info_span!("topology_sync")));

        *task = Some(SyncTask { token, handle });
        self.listening.store(true, Ordering::Release);
        info!("topology sync listening");
        Ok(())
    }

    async fn init_collections_listener(&self) -> Result<WatchReceiver> {
        let (collections, version, rx) = self
            .client
            .get_cluster_state_w()
            .await
            .map_err(|e| Error::watch_read(WatchStream::Collections, e))?;
        apply_collections(&self.cache, &self.event_tx, collections, version);
        Ok(rx)
    }

    async fn init_live_nodes_listener(&self) -> Result<WatchReceiver> {
        let (live_nodes, rx) = self
            .client
            .get_live_nodes_w()
            .await
            .map_err(|e| Error::watch_read(WatchStream::LiveNodes, e))?;
        apply_live_nodes(&self.cache, &self.event_tx, live_nodes);
        Ok(rx)
    }

    /// Copy of the cached topology.
    ///
    /// Never fails; before the first successful `listen()` the state is empty.
    pub fn get_cluster_state(&self) -> Result<ClusterState> {
        Ok(self.cache.snapshot())
    }

    /// Re-reads both documents without touching the watches.
    ///
    /// Stops at the first failing read; the cache keeps whatever was applied
    /// before it.
    pub async fn refresh(&self) -> Result<()> {
        let (collections, version) = self
            .client
            .get_cluster_state()
            .await
            .map_err(|e| Error::watch_read(WatchStream::Collections, e))?;
        apply_collections(&self.cache, &self.event_tx, collections, version);

        let live_nodes = self
            .client
            .get_live_nodes()
            .await
            .map_err(|e| Error::watch_read(WatchStream::LiveNodes, e))?;
        apply_live_nodes(&self.cache, &self.event_tx, live_nodes);
        Ok(())
    }

    /// Stops the background loop and waits for it to exit.
    ///
    /// The cache keeps its last state. No-op when not listening.
    pub async fn stop(&self) -> Result<()> {
        let mut task = self.task.lock().await;
        self.listening.store(false, Ordering::Release);

        if let Some(running) = task.take() {
            running.token.cancel();
            running.handle.await?;
            info!("topology sync stopped");
        }
        Ok(())
    }

    async fn shutdown(running: SyncTask) {
        running.token.cancel();
        if let Err(e) = running.handle.await {
            warn!("topology sync loop ended abnormally: {:?}", e);
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }

    /// Stream of [`SyncEvent`]s emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_tx.subscribe()
    }

    /// Shared handle to the cache for readers that do not own the engine
    pub fn cache(&self) -> Arc<ClusterStateCache> {
        self.cache.clone()
    }
}

impl<C> Drop for TopologySync<C>
where
    C: CoordinationClient + ?Sized,
{
    fn drop(&mut self) {
        if let Some(running) = self.task.get_mut().take() {
            running.token.cancel();
        }
    }
}

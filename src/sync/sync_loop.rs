use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::oneshot::error::RecvError;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::SyncEvent;
use crate::metrics::REFRESH_FAILURES_TOTAL;
use crate::metrics::REFRESH_TOTAL;
use crate::metrics::SESSION_DEGRADED_TOTAL;
use crate::utils::backoff::LinearBackoff;
use crate::ClusterStateCache;
use crate::Collections;
use crate::CoordinationClient;
use crate::CoordinationError;
use crate::SyncConfig;
use crate::WatchEvent;
use crate::WatchReceiver;
use crate::WatchStream;

/// Why a stream's loop woke up
enum Wake {
    Fired(std::result::Result<WatchEvent, RecvError>),
    /// Stream has no armed watch and needs a watching read
    Disarmed,
}

/// Waits for the stream's watch to fire.
///
/// Cancel-safe: if dropped before the watch fires, the receiver stays in
/// place for the next iteration.
async fn wait_for(receiver: &mut Option<WatchReceiver>) -> Wake {
    let Some(rx) = receiver.as_mut() else {
        return Wake::Disarmed;
    };
    let fired = rx.await;
    *receiver = None;
    Wake::Fired(fired)
}

/// Data returned by a watching read
enum Refreshed {
    Collections { collections: Collections, version: i64 },
    LiveNodes(Vec<String>),
}

/// Background consumer of both notification streams.
///
/// Each stream runs its own [`StreamLoop`]; both are driven concurrently
/// so a read stuck on one stream never holds back the other. The shared
/// token stops both.
pub(crate) struct SyncLoop<C>
where
    C: CoordinationClient + ?Sized,
{
    collections: StreamLoop<C>,
    live_nodes: StreamLoop<C>,
    event_tx: broadcast::Sender<SyncEvent>,
}

impl<C> SyncLoop<C>
where
    C: CoordinationClient + ?Sized,
{
    pub(crate) fn new(
        client: Arc<C>,
        cache: Arc<ClusterStateCache>,
        config: &SyncConfig,
        event_tx: broadcast::Sender<SyncEvent>,
        token: CancellationToken,
        collections_rx: WatchReceiver,
        live_nodes_rx: WatchReceiver,
    ) -> Self {
        let backoff = LinearBackoff::new(config.backoff_unit(), config.max_backoff());
        let collections = StreamLoop {
            stream: WatchStream::Collections,
            client: client.clone(),
            cache: cache.clone(),
            event_tx: event_tx.clone(),
            token: token.clone(),
            receiver: Some(collections_rx),
            backoff: backoff.clone(),
        };
        let live_nodes = StreamLoop {
            stream: WatchStream::LiveNodes,
            client,
            cache,
            event_tx: event_tx.clone(),
            token,
            receiver: Some(live_nodes_rx),
            backoff,
        };
        Self {
            collections,
            live_nodes,
            event_tx,
        }
    }

    pub(crate) async fn run(self) {
        info!("topology sync loop started");

        tokio::join!(self.collections.run(), self.live_nodes.run());

        notify(&self.event_tx, SyncEvent::Stopped);
        info!("topology sync loop stopped");
    }
}

/// Watch loop of a single stream.
///
/// Watches are single-shot: every wake-up ends with a new watching read,
/// which refreshes the cache and re-arms the stream in one call. Failures
/// are logged, counted, and retried after a linear backoff; nothing is ever
/// propagated out of the loop.
struct StreamLoop<C>
where
    C: CoordinationClient + ?Sized,
{
    stream: WatchStream,
    client: Arc<C>,
    cache: Arc<ClusterStateCache>,
    event_tx: broadcast::Sender<SyncEvent>,
    token: CancellationToken,
    /// `None` once the watch fired or could not be re-armed
    receiver: Option<WatchReceiver>,
    backoff: LinearBackoff,
}

impl<C> StreamLoop<C>
where
    C: CoordinationClient + ?Sized,
{
    async fn run(mut self) {
        let stream = self.stream;

        loop {
            // A read or backoff sleep may have been cut short by shutdown
            if self.token.is_cancelled() {
                break;
            }

            let wake = tokio::select! {
                _ = self.token.cancelled() => {
                    debug!(%stream, "stream loop received shutdown signal");
                    break;
                }
                wake = wait_for(&mut self.receiver) => wake,
            };

            match wake {
                Wake::Fired(Ok(event)) => self.handle_event(event).await,
                Wake::Fired(Err(_)) => {
                    // Client dropped the watch without firing it
                    error!(%stream, "watch channel closed by coordination client");
                    self.back_off(&CoordinationError::Closed).await;
                }
                Wake::Disarmed => self.rearm().await,
            }
        }
    }

    async fn handle_event(
        &mut self,
        event: WatchEvent,
    ) {
        let stream = self.stream;
        trace!(%stream, ?event, "watch fired");

        if let Some(err) = &event.err {
            error!(%stream, ?event, "error on watch event");
            self.back_off(err).await;
            return;
        }

        if !event.state.is_connected() {
            error!(
                %stream,
                event_type = ?event.event_type,
                state = %event.state,
                "coordination session disconnected"
            );
            SESSION_DEGRADED_TOTAL.with_label_values(&[stream.as_str()]).inc();
            notify(
                &self.event_tx,
                SyncEvent::SessionDegraded {
                    stream,
                    state: event.state,
                },
            );
        } else if stream.is_relevant(event.event_type) {
            debug!(%stream, event_type = ?event.event_type, "topology change notified");
        } else {
            info!(
                %stream,
                event_type = ?event.event_type,
                state = %event.state,
                "coordination state changed"
            );
        }

        self.rearm().await;
    }

    async fn watching_read(&self) -> std::result::Result<(Refreshed, WatchReceiver), CoordinationError> {
        match self.stream {
            WatchStream::Collections => {
                let (collections, version, rx) = self.client.get_cluster_state_w().await?;
                Ok((Refreshed::Collections { collections, version }, rx))
            }
            WatchStream::LiveNodes => {
                let (live_nodes, rx) = self.client.get_live_nodes_w().await?;
                Ok((Refreshed::LiveNodes(live_nodes), rx))
            }
        }
    }

    /// Watching read of the stream: refreshes the cache and arms a fresh watch.
    ///
    /// Abandoned on shutdown, leaving the stream disarmed.
    async fn rearm(&mut self) {
        let stream = self.stream;
        let result = tokio::select! {
            result = self.watching_read() => result,
            _ = self.token.cancelled() => {
                debug!(%stream, "watching read interrupted by shutdown");
                return;
            }
        };

        match result {
            Ok((refreshed, rx)) => {
                match refreshed {
                    Refreshed::Collections { collections, version } => {
                        apply_collections(&self.cache, &self.event_tx, collections, version)
                    }
                    Refreshed::LiveNodes(live_nodes) => apply_live_nodes(&self.cache, &self.event_tx, live_nodes),
                }
                self.receiver = Some(rx);
                if self.backoff.failures() > 0 {
                    info!(%stream, failures = self.backoff.failures(), "watch re-armed after failures");
                }
                self.backoff.reset();
            }
            Err(e) => self.back_off(&e).await,
        }
    }

    /// Sleeps `consecutive failures × unit`, returning early on shutdown.
    ///
    /// The stream stays disarmed, so the next loop iteration retries the
    /// watching read.
    async fn back_off(
        &mut self,
        err: &CoordinationError,
    ) {
        let stream = self.stream;
        self.receiver = None;
        let delay = self.backoff.next_delay();
        let consecutive_failures = self.backoff.failures();

        REFRESH_FAILURES_TOTAL.with_label_values(&[stream.as_str()]).inc();
        warn!(
            %stream,
            consecutive_failures,
            ?delay,
            "error syncing topology from coordination service: {}",
            err
        );
        notify(
            &self.event_tx,
            SyncEvent::RefreshFailed {
                stream,
                consecutive_failures,
                delay,
                error: err.to_string(),
            },
        );

        tokio::select! {
            _ = sleep(delay) => {}
            _ = self.token.cancelled() => {
                debug!(%stream, "backoff interrupted by shutdown");
            }
        }
    }
}

pub(crate) fn apply_collections(
    cache: &ClusterStateCache,
    event_tx: &broadcast::Sender<SyncEvent>,
    collections: Collections,
    version: i64,
) {
    cache.set_collections(collections, version);
    REFRESH_TOTAL.with_label_values(&[WatchStream::Collections.as_str()]).inc();
    notify(event_tx, SyncEvent::CollectionsUpdated { version });
}

pub(crate) fn apply_live_nodes(
    cache: &ClusterStateCache,
    event_tx: &broadcast::Sender<SyncEvent>,
    live_nodes: Vec<String>,
) {
    cache.set_live_nodes(live_nodes.clone());
    REFRESH_TOTAL.with_label_values(&[WatchStream::LiveNodes.as_str()]).inc();
    notify(event_tx, SyncEvent::LiveNodesUpdated { live_nodes });
}

pub(crate) fn notify(
    event_tx: &broadcast::Sender<SyncEvent>,
    event: SyncEvent,
) {
    if event_tx.send(event).is_err() {
        trace!("no sync event subscribers");
    }
}

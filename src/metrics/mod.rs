use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounterVec;
use prometheus::IntGaugeVec;
use prometheus::Opts;
use prometheus::Registry;
use prometheus::TextEncoder;
use tracing::error;


lazy_static! {
    pub static ref REFRESH_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("topology_refresh_total", "Successful topology refreshes applied to the cache"),
        &["stream"]
    )
    .expect("metric can not be created");

    pub static ref REFRESH_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("topology_refresh_failures_total", "Failed topology refreshes and watch errors"),
        &["stream"]
    )
    .expect("metric can not be created");

    pub static ref SESSION_DEGRADED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("topology_session_degraded_total", "Watch events reported below the connected state"),
        &["stream"]
    )
    .expect("metric can not be created");

    /// Per cache; the `instance` label tells engines of one process apart
    pub static ref LIVE_NODES: IntGaugeVec = IntGaugeVec::new(
        Opts::new("topology_live_nodes", "Number of live nodes in the cached cluster state"),
        &["instance"]
    )
    .expect("metric can not be created");

    pub static ref CLUSTER_STATE_VERSION: IntGaugeVec = IntGaugeVec::new(
        Opts::new("topology_cluster_state_version", "Version of the cached cluster-state document"),
        &["instance"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = {
        let registry = Registry::new();
        register_custom_metrics(&registry);
        registry
    };
}

pub(crate) fn register_custom_metrics(registry: &Registry) {
    registry
        .register(Box::new(REFRESH_TOTAL.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(REFRESH_FAILURES_TOTAL.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(SESSION_DEGRADED_TOTAL.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(LIVE_NODES.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(CLUSTER_STATE_VERSION.clone()))
        .expect("collector can be registered");
}

/// Render all topology metrics in the Prometheus text exposition format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        error!("could not encode custom metrics: {}", e);
    };
    match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            error!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    }
}

// -
// Backoff

/// Unit of the linear backoff applied after each consecutive refresh failure
pub(crate) const DEFAULT_BACKOFF_UNIT_MS: u64 = 500;

/// 0 leaves the backoff unbounded
pub(crate) const DEFAULT_MAX_BACKOFF_MS: u64 = 0;

/// Metric label of an engine whose config names no instance
pub(crate) const DEFAULT_INSTANCE: &str = "default";

// -
// Sync events

/// Capacity of the broadcast channel carrying [`SyncEvent`](crate::SyncEvent)s
pub(crate) const DEFAULT_EVENT_BUFFER: usize = 128;

// -
// Replica states as written in the cluster-state document

pub const REPLICA_STATE_ACTIVE: &str = "active";
pub const REPLICA_LEADER_FLAG: &str = "true";

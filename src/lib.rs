//! Client-side cache of a search cluster's topology.
//!
//! [`TopologySync`] subscribes to the coordination service through a
//! [`CoordinationClient`], keeps the set of live nodes and the
//! collection → shard → replica layout in a [`ClusterStateCache`], and hands
//! out [`ClusterState`] copies to routers deciding which node to contact.

mod cache;
mod config;
mod constants;
mod coordination;
mod errors;
mod sync;
mod topology;
pub mod metrics;
pub mod utils;

pub use cache::*;
pub use config::*;
pub use constants::REPLICA_LEADER_FLAG;
pub use constants::REPLICA_STATE_ACTIVE;
pub use coordination::*;
pub use errors::*;
pub use sync::*;
pub use topology::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub(crate) mod test_utils;

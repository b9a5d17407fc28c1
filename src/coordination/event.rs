use std::fmt;

use crate::CoordinationError;

/// Kind of change reported by a fired watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    NodeCreated,
    NodeDeleted,
    /// Content of the watched document changed
    NodeDataChanged,
    /// A child was added under or removed from the watched path
    NodeChildrenChanged,
    /// Session state transition with no data change attached
    Session,
    /// Watch was dropped by the service (usually together with an error)
    NotWatching,
}

/// Coordination session state.
///
/// Ordinals follow the coordination service's own numbering so that states
/// can be compared against [`SessionState::Connected`] the way the service's
/// clients do: anything below it is not (fully) connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Unknown,
    Disconnected,
    Connecting,
    AuthFailed,
    ConnectedReadOnly,
    SaslAuthenticated,
    Expired,
    Connected,
    HasSession,
}

impl SessionState {
    pub fn ordinal(self) -> i32 {
        match self {
            SessionState::Unknown => -1,
            SessionState::Disconnected => 0,
            SessionState::Connecting => 1,
            SessionState::AuthFailed => 4,
            SessionState::ConnectedReadOnly => 5,
            SessionState::SaslAuthenticated => 6,
            SessionState::Expired => -112,
            SessionState::Connected => 100,
            SessionState::HasSession => 101,
        }
    }

    /// True at or above the `Connected` threshold
    pub fn is_connected(self) -> bool {
        self.ordinal() >= SessionState::Connected.ordinal()
    }
}

impl fmt::Display for SessionState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:?}({})", self, self.ordinal())
    }
}

/// Notification delivered once per registered watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub event_type: EventType,
    pub err: Option<CoordinationError>,
    pub state: SessionState,
}

impl WatchEvent {
    pub fn new(
        event_type: EventType,
        state: SessionState,
    ) -> Self {
        Self {
            event_type,
            err: None,
            state,
        }
    }

    pub fn data_changed() -> Self {
        Self::new(EventType::NodeDataChanged, SessionState::HasSession)
    }

    pub fn children_changed() -> Self {
        Self::new(EventType::NodeChildrenChanged, SessionState::HasSession)
    }

    /// Watch dropped because of `err`
    pub fn failed(err: CoordinationError) -> Self {
        Self {
            event_type: EventType::NotWatching,
            err: Some(err),
            state: SessionState::Disconnected,
        }
    }
}

//! Plugin lifecycle state

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    /// Not started, or started without a usable identifier
    Uninitialized,
    /// Waiting for the next heartbeat
    Idle,
    Connecting,
    AwaitingResponse,
    Reconciling,
    Stopped,
}

impl PluginState {
    /// A request is outstanding
    pub fn in_flight(self) -> bool {
        matches!(
            self,
            PluginState::Connecting | PluginState::AwaitingResponse | PluginState::Reconciling
        )
    }
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginState::Uninitialized => write!(f, "uninitialized"),
            PluginState::Idle => write!(f, "idle"),
            PluginState::Connecting => write!(f, "connecting"),
            PluginState::AwaitingResponse => write!(f, "awaiting-response"),
            PluginState::Reconciling => write!(f, "reconciling"),
            PluginState::Stopped => write!(f, "stopped"),
        }
    }
}

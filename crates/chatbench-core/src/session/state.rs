use std::time::Duration;

use serde::Serialize;

/// Lifecycle of the controller's single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Submitting,
    Streaming,
    Finalizing,
    Aborted,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Submitting => "submitting",
            SessionState::Streaming => "streaming",
            SessionState::Finalizing => "finalizing",
            SessionState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Progress notifications, tagged with the session generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Started { session: u64, slot: usize },
    Chunk { session: u64, text: String },
    Completed { session: u64, content: String },
    Aborted { session: u64, content: String },
    Failed { session: u64, error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Completed,
    Aborted,
}

/// How a session that did not fail came to an end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub status: SessionStatus,
    /// Final content of the assistant reply.
    pub content: String,
    /// Number of chunks applied.
    pub chunks: usize,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long to keep listening after the trigger succeeded without the
    /// channel closing or sending the sentinel.
    pub drain_timeout: Duration,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            drain_timeout: Duration::from_secs(2),
            event_capacity: 256,
        }
    }
}

impl SessionConfig {
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }
}

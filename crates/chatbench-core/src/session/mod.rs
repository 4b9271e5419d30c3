//! Streaming chat sessions.

mod controller;
mod error;
mod state;

pub use controller::SessionController;
pub use error::SessionError;
pub use state::{SessionConfig, SessionEvent, SessionOutcome, SessionState, SessionStatus};

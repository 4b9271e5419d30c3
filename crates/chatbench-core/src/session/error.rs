use thiserror::Error;

use crate::transcript::MutationError;
use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a chat session is already running")]
    SessionBusy,

    #[error("no chat session is running")]
    NoActiveSession,

    #[error("submission failed: {0}")]
    SubmissionFailed(#[source] TransportError),

    #[error("stream interrupted: {0}")]
    StreamInterrupted(#[source] TransportError),

    #[error("invalid transcript edit: {0}")]
    InvalidMutation(#[from] MutationError),
}

impl SessionError {
    /// Underlying transport failure, if any.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            SessionError::SubmissionFailed(e) | SessionError::StreamInterrupted(e) => Some(e),
            _ => None,
        }
    }
}

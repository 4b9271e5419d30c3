//! Push channel and trigger plumbing between the session controller and the
//! completion server.

mod http;
#[cfg(test)]
pub(crate) mod scripted;

use std::pin::Pin;

use async_trait::async_trait;
use chatbench_models::CompletionRequest;
use futures::Stream;
use thiserror::Error;

pub use http::HttpTransport;

/// Payload that marks the end of a streamed completion.
///
/// A genuine chunk whose text is exactly `end` is indistinguishable from it.
pub const END_SENTINEL: &str = "end";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed push payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("push channel closed")]
    Closed,
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Decoded push-channel payloads in delivery order. Finite and not
/// restartable; dropping it closes the channel.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Open the push channel. Resolves once the server has accepted the
    /// subscription, so no payload sent after that is missed.
    async fn open_channel(&self) -> Result<ChunkStream, TransportError>;

    /// Issue the triggering request. Resolves when the server answers.
    async fn trigger(&self, request: &CompletionRequest) -> Result<(), TransportError>;

    /// Ask the server to stop the running completion.
    async fn abort(&self) -> Result<(), TransportError>;
}

//! Server side of a chat: streams one provider completion at a time and fans
//! its text out to every push-channel subscriber.

use std::sync::Arc;

use chatbench_ai::{AiError, LlmClient};
use chatbench_models::{CompletionRequest, ParamError};
use futures::StreamExt;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::transport::END_SENTINEL;

const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("a completion is already running")]
    Busy,

    #[error("no completion provider is configured")]
    NotConfigured,

    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] ParamError),

    #[error(transparent)]
    Llm(#[from] AiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelayOutcome {
    /// Text deltas broadcast.
    pub chunks: usize,
    pub aborted: bool,
}

pub struct CompletionRelay {
    llm: Option<Arc<dyn LlmClient>>,
    sender: broadcast::Sender<String>,
    active: Mutex<Option<CancellationToken>>,
}

impl CompletionRelay {
    pub fn new(llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self::with_capacity(llm, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(llm: Option<Arc<dyn LlmClient>>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            llm,
            sender,
            active: Mutex::new(None),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Subscribe to raw text payloads; `"end"` follows each finished or
    /// aborted completion.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    /// Stream one completion to subscribers, resolving once it has ended.
    ///
    /// A provider failure is returned without broadcasting the sentinel.
    pub async fn run(&self, request: CompletionRequest) -> Result<RelayOutcome, RelayError> {
        request.params().validate()?;
        let llm = self.llm.clone().ok_or(RelayError::NotConfigured)?;

        let token = {
            let mut active = self.active.lock();
            if active.is_some() {
                return Err(RelayError::Busy);
            }
            let token = CancellationToken::new();
            *active = Some(token.clone());
            token
        };
        let _clear = scopeguard::guard((), |_| {
            self.active.lock().take();
        });

        info!(
            provider = llm.provider(),
            model = %request.model,
            messages = request.messages.len(),
            "Relaying completion"
        );

        let mut stream = llm.complete_stream(request);
        let mut chunks = 0;
        let aborted = loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break true,
                item = stream.next() => match item {
                    Some(Ok(chunk)) => {
                        if !chunk.text.is_empty() {
                            self.broadcast(chunk.text);
                            chunks += 1;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, chunks, "Completion failed");
                        return Err(RelayError::Llm(e));
                    }
                    None => break false,
                },
            }
        };

        self.broadcast(END_SENTINEL.to_string());
        info!(chunks, aborted, "Completion finished");
        Ok(RelayOutcome { chunks, aborted })
    }

    /// Cancel the running completion. Returns whether one was running.
    pub fn abort(&self) -> bool {
        match self.active.lock().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn broadcast(&self, payload: String) {
        if self.sender.send(payload).is_err() {
            debug!("No push-channel subscribers");
        }
    }
}

//! In-memory transport driven by the test body.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chatbench_models::CompletionRequest;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::{ChunkStream, CompletionTransport, TransportError};

type Payload = Result<String, TransportError>;

pub(crate) struct ScriptedTransport {
    channel: Mutex<Option<mpsc::UnboundedReceiver<Payload>>>,
    trigger: Mutex<Option<oneshot::Receiver<Result<(), TransportError>>>>,
    open_error: Mutex<Option<TransportError>>,
    requests: Mutex<Vec<CompletionRequest>>,
    aborts: AtomicUsize,
}

/// Test-side ends of a [`ScriptedTransport`].
pub(crate) struct Script {
    pub chunks: mpsc::UnboundedSender<Payload>,
    /// Resolves the pending trigger; `None` when the trigger answers at once.
    pub trigger: Option<oneshot::Sender<Result<(), TransportError>>>,
}

impl Script {
    pub fn send(&self, chunk: &str) {
        let _ = self.chunks.send(Ok(chunk.to_string()));
    }

    pub fn fail(&self, error: TransportError) {
        let _ = self.chunks.send(Err(error));
    }

    pub fn resolve_trigger(&mut self, result: Result<(), TransportError>) {
        if let Some(tx) = self.trigger.take() {
            let _ = tx.send(result);
        }
    }
}

impl ScriptedTransport {
    /// Transport whose trigger waits for [`Script::resolve_trigger`].
    pub fn pending() -> (Self, Script) {
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        let (trigger_tx, trigger_rx) = oneshot::channel();
        let transport = Self {
            channel: Mutex::new(Some(chunk_rx)),
            trigger: Mutex::new(Some(trigger_rx)),
            open_error: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            aborts: AtomicUsize::new(0),
        };
        (
            transport,
            Script {
                chunks: chunk_tx,
                trigger: Some(trigger_tx),
            },
        )
    }

    /// Transport whose trigger answers immediately with `result`.
    pub fn answering(result: Result<(), TransportError>) -> (Self, Script) {
        let (transport, mut script) = Self::pending();
        script.resolve_trigger(result);
        (transport, script)
    }

    pub fn failing_open(error: TransportError) -> Self {
        let (transport, _) = Self::pending();
        *transport.open_error.lock() = Some(error);
        transport
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    pub fn abort_count(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionTransport for ScriptedTransport {
    async fn open_channel(&self) -> Result<ChunkStream, TransportError> {
        if let Some(error) = self.open_error.lock().take() {
            return Err(error);
        }
        let rx = self.channel.lock().take().ok_or(TransportError::Closed)?;
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn trigger(&self, request: &CompletionRequest) -> Result<(), TransportError> {
        self.requests.lock().push(request.clone());
        let pending = self.trigger.lock().take();
        match pending {
            Some(rx) => rx.await.unwrap_or(Ok(())),
            None => Ok(()),
        }
    }

    async fn abort(&self) -> Result<(), TransportError> {
        self.aborts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

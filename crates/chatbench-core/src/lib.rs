pub mod client;
pub mod paths;
pub mod relay;
pub mod session;
pub mod storage;
pub mod transcript;
pub mod transport;

pub use chatbench_models as models;

pub use client::PresetClient;
pub use relay::{CompletionRelay, RelayError, RelayOutcome};
pub use session::{
    SessionConfig, SessionController, SessionError, SessionEvent, SessionOutcome, SessionState,
    SessionStatus,
};
pub use transcript::{MutationError, Transcript};
pub use transport::{
    ChunkStream, CompletionTransport, END_SENTINEL, HttpTransport, TransportError,
};

use std::path::Path;
use std::sync::Arc;

use chatbench_ai::LlmClient;
use storage::Storage;
use tracing::info;

/// Server-side application state: the preset store and the completion relay.
pub struct AppCore {
    pub storage: Arc<Storage>,
    pub relay: Arc<CompletionRelay>,
}

impl AppCore {
    /// Open the preset database and wire the relay to `llm`.
    ///
    /// Without a provider the relay answers every trigger with
    /// [`RelayError::NotConfigured`]; presets keep working.
    pub async fn new(
        db_path: impl AsRef<Path>,
        llm: Option<Arc<dyn LlmClient>>,
    ) -> anyhow::Result<Self> {
        let storage = Arc::new(Storage::new(db_path)?);

        match llm.as_ref() {
            Some(llm) => info!(provider = llm.provider(), "Initializing chatbench"),
            None => info!("Initializing chatbench without a completion provider"),
        }

        Ok(Self {
            storage,
            relay: Arc::new(CompletionRelay::new(llm)),
        })
    }
}

//! Deterministic mock LLM client for relay and server tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_stream::stream;
use chatbench_models::CompletionRequest;
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};

use crate::error::AiError;

use super::{FinishReason, LlmClient, StreamChunk, StreamResult};

/// Deterministic step for scripted mock completions.
#[derive(Debug, Clone)]
pub enum MockStepKind {
    /// Stream the given text fragments in order.
    Chunks(Vec<String>),
    /// Stream the fragments, then fail.
    ChunksThenError(Vec<String>, String),
    /// Fail before producing anything.
    Error(String),
}

/// Scripted completion step with an optional delay between fragments.
#[derive(Debug, Clone)]
pub struct MockStep {
    pub delay_ms: u64,
    pub kind: MockStepKind,
}

impl MockStep {
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            delay_ms: 0,
            kind: MockStepKind::Chunks(chunks.into_iter().map(Into::into).collect()),
        }
    }

    pub fn chunks_then_error<I, S>(chunks: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            delay_ms: 0,
            kind: MockStepKind::ChunksThenError(
                chunks.into_iter().map(Into::into).collect(),
                message.into(),
            ),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            delay_ms: 0,
            kind: MockStepKind::Error(message.into()),
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// A deterministic mock LLM client driven by scripted steps.
///
/// Each `complete_stream` call consumes one step; with the script exhausted
/// it echoes the last user message.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLlmClient {
    script: Arc<Mutex<VecDeque<MockStep>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<MockStep>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(steps))),
            requests: Arc::default(),
        }
    }

    pub async fn push_step(&self, step: MockStep) {
        self.script.lock().await.push_back(step);
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    fn fallback_step(request: &CompletionRequest) -> MockStep {
        let text = request
            .messages
            .iter()
            .rev()
            .find(|msg| matches!(msg.role, chatbench_models::Role::User))
            .map(|msg| format!("mock-echo: {}", msg.content))
            .unwrap_or_else(|| "mock-ok".to_string());
        MockStep::chunks([text])
    }
}

impl LlmClient for ScriptedLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn complete_stream(&self, request: CompletionRequest) -> StreamResult {
        let client = self.clone();
        Box::pin(stream! {
            client.requests.lock().await.push(request.clone());
            let step = client.script.lock().await.pop_front();
            let step = step.unwrap_or_else(|| ScriptedLlmClient::fallback_step(&request));

            let (chunks, failure) = match step.kind {
                MockStepKind::Chunks(chunks) => (chunks, None),
                MockStepKind::ChunksThenError(chunks, message) => (chunks, Some(message)),
                MockStepKind::Error(message) => (Vec::new(), Some(message)),
            };

            for chunk in chunks {
                if step.delay_ms > 0 {
                    sleep(Duration::from_millis(step.delay_ms)).await;
                }
                yield Ok(StreamChunk::text(chunk));
            }

            if let Some(message) = failure {
                yield Err(AiError::Llm(message));
            } else {
                yield Ok(StreamChunk::final_chunk(FinishReason::Stop));
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::{StreamExt, TryStreamExt};

    use super::*;
    use chatbench_models::{CompletionParams, Message};

    fn request(text: &str) -> CompletionRequest {
        CompletionRequest::new(&CompletionParams::default(), vec![Message::user(text)])
    }

    #[tokio::test]
    async fn mock_client_streams_scripted_chunks() {
        let client = ScriptedLlmClient::from_steps(vec![MockStep::chunks(["Hel", "lo!"])]);

        let chunks = client
            .complete_stream(request("hi"))
            .try_collect::<Vec<_>>()
            .await
            .expect("stream should succeed");

        assert_eq!(chunks[0].text, "Hel");
        assert_eq!(chunks[1].text, "lo!");
        assert_eq!(chunks[2].finish_reason, Some(FinishReason::Stop));
    }

    #[tokio::test]
    async fn mock_client_echoes_when_script_exhausted() {
        let client = ScriptedLlmClient::new();

        let chunks = client
            .complete_stream(request("ping"))
            .try_collect::<Vec<_>>()
            .await
            .unwrap();

        assert_eq!(chunks[0].text, "mock-echo: ping");
        assert_eq!(client.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn mock_client_fails_after_chunks() {
        let client =
            ScriptedLlmClient::from_steps(vec![MockStep::chunks_then_error(["par"], "boom")]);

        let items: Vec<_> = client.complete_stream(request("hi")).collect().await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(&items[1], Err(AiError::Llm(m)) if m == "boom"));
    }
}

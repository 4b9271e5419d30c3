//! OpenAI LLM provider

use chatbench_models::CompletionRequest;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;

use crate::error::AiError;
use crate::http_client::{build_http_client, response_to_error};
use crate::llm::client::{FinishReason, LlmClient, StreamChunk, StreamResult};
use crate::sse::SseDecoder;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI client
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set custom base URL (for API-compatible services)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

// Streaming types

#[derive(Deserialize, Debug)]
struct OpenAIStreamResponse {
    #[serde(default)]
    choices: Vec<OpenAIStreamChoice>,
}

#[derive(Deserialize, Debug)]
struct OpenAIStreamChoice {
    #[serde(default)]
    index: u32,
    #[serde(default)]
    delta: OpenAIStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct OpenAIStreamDelta {
    content: Option<String>,
}

/// Turn one SSE `data` payload into chunks.
///
/// Only choice 0 is relayed; with `n > 1` the remaining choices are dropped.
fn chunks_from_payload(data: &str) -> Vec<StreamChunk> {
    let parsed: OpenAIStreamResponse = match serde_json::from_str(data) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping unparseable OpenAI stream event");
            return Vec::new();
        }
    };

    let mut chunks = Vec::new();
    for choice in parsed.choices.into_iter().filter(|c| c.index == 0) {
        if let Some(content) = choice.delta.content
            && !content.is_empty()
        {
            chunks.push(StreamChunk::text(content));
        }
        if let Some(reason) = choice.finish_reason {
            chunks.push(StreamChunk::final_chunk(FinishReason::from_openai(&reason)));
        }
    }
    chunks
}

impl LlmClient for OpenAIClient {
    fn provider(&self) -> &str {
        "openai"
    }

    fn complete_stream(&self, request: CompletionRequest) -> StreamResult {
        let client = self.client.clone();
        let api_key = self.api_key.clone();
        let base_url = self.base_url.clone();

        Box::pin(async_stream::stream! {
            let body = serde_json::json!({
                "model": request.model,
                "messages": request.messages,
                "temperature": request.temperature,
                "max_tokens": request.max_tokens,
                "top_p": request.top_p,
                "presence_penalty": request.presence_penalty,
                "frequency_penalty": request.frequency_penalty,
                "n": request.n,
                "stream": true,
            });

            tracing::debug!(model = %request.model, messages = request.messages.len(), "Starting OpenAI stream");

            let response = match client
                .post(format!("{}/chat/completions", base_url))
                .header("Authorization", format!("Bearer {}", api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    yield Err(AiError::Http(e));
                    return;
                }
            };

            if !response.status().is_success() {
                yield Err(response_to_error(response, "OpenAI").await);
                return;
            }

            let mut byte_stream = response.bytes_stream();
            let mut decoder = SseDecoder::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(AiError::Llm(format!("Stream error: {}", e)));
                        return;
                    }
                };

                for event in decoder.push(&bytes) {
                    if event.data.trim() == "[DONE]" {
                        return;
                    }
                    for chunk in chunks_from_payload(&event.data) {
                        yield Ok(chunk);
                    }
                }
            }

            // Last event may lack its trailing blank line
            if let Some(event) = decoder.finish()
                && event.data.trim() != "[DONE]"
            {
                for chunk in chunks_from_payload(&event.data) {
                    yield Ok(chunk);
                }
            }
        })
    }
}

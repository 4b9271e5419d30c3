//! chatbench AI - streaming chat-completion providers
//!
//! This crate provides:
//! - The `LlmClient` trait the completion relay streams from
//! - An OpenAI-compatible streaming client
//! - A scripted mock client for deterministic tests
//! - The incremental SSE decoder shared with the push-channel transport

pub mod error;
mod http_client;
pub mod llm;
pub mod sse;

pub use error::{AiError, Result};
pub use http_client::{build_http_client, truncate_body};
pub use llm::{
    FinishReason, LlmClient, MockStep, OpenAIClient, ScriptedLlmClient, StreamChunk, StreamResult,
};
pub use sse::{SseDecoder, SseEvent};

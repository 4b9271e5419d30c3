//! LLM module - streaming provider client abstraction

mod client;
mod mock_client;
mod openai;

pub use client::{FinishReason, LlmClient, StreamChunk, StreamResult};
pub use mock_client::{MockStep, MockStepKind, ScriptedLlmClient};
pub use openai::{DEFAULT_BASE_URL, OpenAIClient};

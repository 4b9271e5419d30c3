use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::params::CompletionParams;

/// Body of `POST /trigger`: the outbound message sequence plus parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub n: u32,
}

impl CompletionRequest {
    pub fn new(params: &CompletionParams, messages: Vec<Message>) -> Self {
        Self {
            model: params.model.clone(),
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            presence_penalty: params.presence_penalty,
            frequency_penalty: params.frequency_penalty,
            n: params.n,
        }
    }

    /// The parameter half of the request.
    pub fn params(&self) -> CompletionParams {
        CompletionParams {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
            n: self.n,
        }
    }
}

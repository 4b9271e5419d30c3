//! Completion parameters and their accepted ranges.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_SYSTEM_MESSAGE: &str = "you are a helpful assistant";

/// Inclusive numeric range a parameter must fall in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl std::fmt::Display for ParamRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

pub const TEMPERATURE_RANGE: ParamRange = ParamRange::new(0.0, 2.0);
pub const TOP_P_RANGE: ParamRange = ParamRange::new(0.0, 1.0);
pub const PENALTY_RANGE: ParamRange = ParamRange::new(-2.0, 2.0);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("{field} must be within {range}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        range: ParamRange,
    },

    #[error("{field} must be a positive integer")]
    NotPositive { field: &'static str },

    #[error("model must not be empty")]
    EmptyModel,
}

/// Model selection and sampling parameters sent with every completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub n: u32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: 2086,
            top_p: 1.0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            n: 1,
        }
    }
}

impl CompletionParams {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.model.trim().is_empty() {
            return Err(ParamError::EmptyModel);
        }
        check_range("temperature", self.temperature, TEMPERATURE_RANGE)?;
        check_range("top_p", self.top_p, TOP_P_RANGE)?;
        check_range("presence_penalty", self.presence_penalty, PENALTY_RANGE)?;
        check_range("frequency_penalty", self.frequency_penalty, PENALTY_RANGE)?;
        if self.max_tokens == 0 {
            return Err(ParamError::NotPositive { field: "max_tokens" });
        }
        if self.n == 0 {
            return Err(ParamError::NotPositive { field: "n" });
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f32, range: ParamRange) -> Result<(), ParamError> {
    if range.contains(value) {
        Ok(())
    } else {
        Err(ParamError::OutOfRange {
            field,
            value,
            range,
        })
    }
}

/// Completion parameters together with the text seeding the system message.
///
/// This is the shape a preset stores and the settings panel edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationParameters {
    #[serde(flatten)]
    pub completion: CompletionParams,
    #[serde(rename = "systemMessage")]
    pub system_message: String,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            completion: CompletionParams::default(),
            system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
        }
    }
}

impl GenerationParameters {
    pub fn new(completion: CompletionParams, system_message: impl Into<String>) -> Self {
        Self {
            completion,
            system_message: system_message.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        self.completion.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GenerationParameters::default().validate().is_ok());
    }

    #[test]
    fn test_temperature_out_of_range() {
        let params = CompletionParams::default().with_temperature(2.5);
        assert_eq!(
            params.validate(),
            Err(ParamError::OutOfRange {
                field: "temperature",
                value: 2.5,
                range: TEMPERATURE_RANGE,
            })
        );
    }

    #[test]
    fn test_penalty_bounds_are_inclusive() {
        let params = CompletionParams {
            presence_penalty: -2.0,
            frequency_penalty: 2.0,
            ..CompletionParams::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_zero_counts_rejected() {
        let params = CompletionParams::default().with_max_tokens(0);
        assert_eq!(
            params.validate(),
            Err(ParamError::NotPositive { field: "max_tokens" })
        );

        let params = CompletionParams {
            n: 0,
            ..CompletionParams::default()
        };
        assert_eq!(params.validate(), Err(ParamError::NotPositive { field: "n" }));
    }

    #[test]
    fn test_empty_model_rejected() {
        let params = CompletionParams::default().with_model("  ");
        assert_eq!(params.validate(), Err(ParamError::EmptyModel));
    }

    #[test]
    fn test_generation_parameters_wire_shape() {
        let value = serde_json::to_value(GenerationParameters::default()).unwrap();
        assert_eq!(value["model"], "gpt-3.5-turbo");
        assert_eq!(value["max_tokens"], 2086);
        assert_eq!(value["systemMessage"], "you are a helpful assistant");
        assert!(value.get("completion").is_none());
    }
}

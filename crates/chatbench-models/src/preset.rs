//! Named, persisted bundles of generation parameters.

use serde::{Deserialize, Serialize};

use crate::params::GenerationParameters;

/// A stored preset, as returned by `GET /presets/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    pub id: u64,
    pub name: String,
    #[serde(flatten)]
    pub params: GenerationParameters,
}

/// Body of `POST /presets` and `PUT /presets/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPreset {
    pub name: String,
    #[serde(flatten)]
    pub params: GenerationParameters,
}

impl NewPreset {
    pub fn new(name: impl Into<String>, params: GenerationParameters) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn into_preset(self, id: u64) -> Preset {
        Preset {
            id,
            name: self.name,
            params: self.params,
        }
    }
}

/// List entry of `GET /presets`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresetSummary {
    pub id: u64,
    pub name: String,
}

impl From<&Preset> for PresetSummary {
    fn from(preset: &Preset) -> Self {
        Self {
            id: preset.id,
            name: preset.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preset_record_is_flat() {
        let preset = NewPreset::new("terse", GenerationParameters::default()).into_preset(7);
        let value = serde_json::to_value(&preset).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["name"], "terse");
        assert_eq!(value["model"], "gpt-3.5-turbo");
        assert_eq!(value["systemMessage"], "you are a helpful assistant");
    }

    #[test]
    fn test_new_preset_requires_every_field() {
        let missing_n = json!({
            "name": "x",
            "model": "gpt-4",
            "temperature": 1.0,
            "max_tokens": 10,
            "top_p": 1.0,
            "presence_penalty": 0.0,
            "frequency_penalty": 0.0,
            "systemMessage": "be nice"
        });
        assert!(serde_json::from_value::<NewPreset>(missing_n).is_err());
    }

    #[test]
    fn test_new_preset_parses_original_form_body() {
        let body = json!({
            "name": "creative",
            "model": "gpt-4",
            "temperature": 1.3,
            "max_tokens": 512,
            "top_p": 0.9,
            "presence_penalty": 0.5,
            "frequency_penalty": -0.5,
            "n": 2,
            "systemMessage": "be nice"
        });
        let preset: NewPreset = serde_json::from_value(body).unwrap();
        assert_eq!(preset.name, "creative");
        assert_eq!(preset.params.completion.n, 2);
        assert_eq!(preset.params.system_message, "be nice");
    }
}

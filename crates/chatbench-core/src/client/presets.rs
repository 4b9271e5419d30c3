//! HTTP client for the preset store.
//!
//! Presets are a side collaborator of a chat, so failures are logged and
//! reported as `None`, `false` or an empty list rather than raised.

use chatbench_ai::build_http_client;
use chatbench_models::{NewPreset, Preset, PresetSummary};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

#[derive(Debug, Deserialize)]
struct Created {
    id: u64,
}

#[derive(Debug, Clone)]
pub struct PresetClient {
    client: Client,
    base_url: String,
}

impl PresetClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(build_http_client(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/presets{}", self.base_url, path)
    }

    pub async fn list(&self) -> Vec<PresetSummary> {
        self.fetch(self.client.get(self.url("")), "list presets")
            .await
            .unwrap_or_default()
    }

    pub async fn get(&self, id: u64) -> Option<Preset> {
        self.fetch(self.client.get(self.url(&format!("/{id}"))), "load preset")
            .await
    }

    /// Find a preset by name, falling back to parsing `name_or_id` as an id.
    pub async fn find(&self, name_or_id: &str) -> Option<Preset> {
        let id = match name_or_id.parse::<u64>() {
            Ok(id) => id,
            Err(_) => self
                .list()
                .await
                .into_iter()
                .find(|p| p.name == name_or_id)?
                .id,
        };
        self.get(id).await
    }

    /// Returns the new preset's id.
    pub async fn create(&self, preset: &NewPreset) -> Option<u64> {
        self.fetch::<Created>(self.client.post(self.url("")).json(preset), "save preset")
            .await
            .map(|created| created.id)
    }

    pub async fn update(&self, id: u64, preset: &NewPreset) -> bool {
        self.send(
            self.client.put(self.url(&format!("/{id}"))).json(preset),
            "update preset",
        )
        .await
    }

    pub async fn delete(&self, id: u64) -> bool {
        self.send(self.client.delete(self.url(&format!("/{id}"))), "delete preset")
            .await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Option<T> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Failed to {action}");
                return None;
            }
        };
        if response.status() == StatusCode::NOT_FOUND {
            warn!("Failed to {action}: not found");
            return None;
        }
        if !response.status().is_success() {
            error!(status = %response.status(), "Failed to {action}");
            return None;
        }
        match response.json::<T>().await {
            Ok(value) => Some(value),
            Err(e) => {
                error!(error = %e, "Failed to {action}: unexpected response");
                None
            }
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder, action: &str) -> bool {
        match request.send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                error!(status = %response.status(), "Failed to {action}");
                false
            }
            Err(e) => {
                error!(error = %e, "Failed to {action}");
                false
            }
        }
    }
}

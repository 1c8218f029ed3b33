//! OpenAI-compatible embeddings over blocking HTTP

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::EmbeddingProvider;
use crate::config::EmbeddingsConfig;

/// Remote embedder for any `/embeddings` endpoint speaking the OpenAI shape
pub struct OpenAiEmbedder {
    base_url: String,
    model: String,
    api_key: Option<String>,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    /// Build from config, reading the API key from the configured env var
    pub fn from_config(config: &EmbeddingsConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::new(
            &config.base_url,
            &config.model,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }
}

impl EmbeddingProvider for OpenAiEmbedder {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("No API key configured for embeddings");
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .with_context(|| format!("Failed to reach embeddings endpoint {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            bail!("Embeddings request failed ({}): {}", status, body);
        }

        let parsed: EmbeddingResponse = response
            .json()
            .context("Failed to parse embeddings response")?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| anyhow!("Embeddings response contained no vector"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

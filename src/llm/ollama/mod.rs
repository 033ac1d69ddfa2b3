#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LanguageModel;
use crate::config::{GenerationConfig, OllamaConfig};
use crate::ollama::OllamaClient;

/// Sampling options forwarded verbatim in the `options` object of a generate request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOptions {
    pub num_predict: u32,
    pub num_ctx: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

impl From<&GenerationConfig> for GenerationOptions {
    #[inline]
    fn from(config: &GenerationConfig) -> Self {
        Self {
            num_predict: config.num_predict,
            num_ctx: config.num_ctx,
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
    model: String,
    options: GenerationOptions,
    keep_alive: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    keep_alive: &'a str,
    options: &'a GenerationOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaLlm {
    #[inline]
    pub fn new(ollama: &OllamaConfig, generation: &GenerationConfig) -> Result<Self> {
        let client = OllamaClient::new(ollama).context("Failed to create Ollama client")?;
        Ok(Self::with_client(client, generation))
    }

    #[inline]
    pub fn with_client(client: OllamaClient, generation: &GenerationConfig) -> Self {
        Self {
            client,
            model: generation.model.clone(),
            options: GenerationOptions::from(generation),
            keep_alive: generation.keep_alive.clone(),
        }
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Blocking completion request
    #[inline]
    pub fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            "Generating completion with {} (prompt length: {})",
            self.model,
            prompt.len()
        );

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            keep_alive: &self.keep_alive,
            options: &self.options,
        };

        let response_text = self
            .client
            .post_json("/api/generate", &request)
            .context("Failed to generate completion")?;

        let response: GenerateResponse = serde_json::from_str(&response_text)
            .context("Failed to parse generation response")?;

        debug!("Generated {} characters", response.response.len());
        Ok(response.response)
    }
}

#[async_trait]
impl LanguageModel for OllamaLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let llm = self.clone();
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || llm.complete(&prompt))
            .await
            .context("Generation task failed to complete")?
    }
}

// Language model module
// Completion of fully rendered prompts

pub mod ollama;

use anyhow::Result;
use async_trait::async_trait;

pub use ollama::{GenerationOptions, OllamaLlm};

/// Produces a completion for a fully substituted prompt
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// Embeddings module
// Text-to-vector conversion for indexing and query time

pub mod ollama;

use anyhow::Result;
use async_trait::async_trait;

pub use ollama::OllamaEmbedder;

/// Converts text into vectors comparable by the vector index
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of documents, one vector per input in input order
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single search query
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

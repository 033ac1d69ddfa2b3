
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::RagError;
use crate::config::{Config, RetrievalConfig};
use crate::database::VectorStore;
use crate::dataset::Document;
use crate::embeddings::{Embedder, OllamaEmbedder};

const SIMILARITY_SEARCH: &str = "similarity";

/// Fetches the documents most relevant to a query, best match first
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Document>>;
}

/// Where retrieval is served from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieverBackend {
    LanceDb,
    Http,
}

impl FromStr for RetrieverBackend {
    type Err = RagError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lancedb" => Ok(Self::LanceDb),
            "http" => Ok(Self::Http),
            other => Err(RagError::RetrieverUnsupported(format!(
                "unknown backend '{}' (expected 'lancedb' or 'http')",
                other
            ))),
        }
    }
}

impl RetrieverBackend {
    /// Resolve the configured backend, rejecting search modes no backend implements
    #[inline]
    pub fn from_config(config: &RetrievalConfig) -> Result<Self, RagError> {
        if !config.search_type.trim().eq_ignore_ascii_case(SIMILARITY_SEARCH) {
            return Err(RagError::RetrieverUnsupported(format!(
                "search type '{}' is not supported; only '{}' search is available",
                config.search_type, SIMILARITY_SEARCH
            )));
        }
        config.backend.parse()
    }
}

/// Select and construct the retriever once, at startup
#[inline]
pub async fn build_retriever(config: &Config) -> Result<Arc<dyn Retriever>, RagError> {
    match RetrieverBackend::from_config(&config.retrieval)? {
        RetrieverBackend::LanceDb => {
            let embedder = OllamaEmbedder::new(&config.ollama)
                .map_err(|e| RagError::Embedding(format!("{:#}", e)))?;
            let store = VectorStore::new(config).await?;
            info!(
                "Using local vector index at {}",
                config.index_path().display()
            );
            Ok(Arc::new(VectorStoreRetriever::new(Arc::new(embedder), store)))
        }
        RetrieverBackend::Http => {
            let endpoint = config.retrieval.endpoint.as_deref().ok_or_else(|| {
                RagError::RetrieverUnsupported(
                    "the 'http' backend needs retrieval.endpoint".to_string(),
                )
            })?;
            let endpoint = Url::parse(endpoint)
                .map_err(|e| RagError::Config(format!("Invalid search endpoint: {}", e)))?;
            info!("Using remote search service at {}", endpoint);
            Ok(Arc::new(HttpSearchRetriever::new(
                endpoint,
                Duration::from_secs(config.ollama.timeout_secs),
            )))
        }
    }
}

/// Similarity search over the local LanceDB index
pub struct VectorStoreRetriever {
    embedder: Arc<dyn Embedder>,
    store: VectorStore,
}

impl VectorStoreRetriever {
    #[inline]
    pub fn new(embedder: Arc<dyn Embedder>, store: VectorStore) -> Self {
        Self { embedder, store }
    }
}

#[async_trait]
impl Retriever for VectorStoreRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Document>> {
        let query_vector = self
            .embedder
            .embed_query(query)
            .await
            .context("Failed to embed query")?;

        let results = self
            .store
            .search_similar(&query_vector, k)
            .await
            .context("Vector search failed")?;

        debug!("Vector search returned {} documents", results.len());
        Ok(results.into_iter().map(|result| result.document).collect())
    }
}

/// Search delegated to a remote service that speaks `{query, k}` over JSON
#[derive(Debug, Clone)]
pub struct HttpSearchRetriever {
    endpoint: Url,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

/// One item of a search response; bare strings carry no metadata
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchHit {
    Text(String),
    Document(Document),
}

impl From<SearchHit> for Document {
    fn from(hit: SearchHit) -> Self {
        match hit {
            SearchHit::Text(text) => Document::from(text),
            SearchHit::Document(document) => document,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Hits(Vec<SearchHit>),
    Wrapped { documents: Vec<SearchHit> },
}

impl HttpSearchRetriever {
    #[inline]
    pub fn new(endpoint: Url, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { endpoint, agent }
    }

    /// Run the search request on the calling thread
    #[inline]
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<Document>> {
        debug!("Searching {} for top {} documents", self.endpoint, k);

        let body = serde_json::to_string(&SearchRequest { query, k })
            .context("Failed to serialize search request")?;

        let response_text = self
            .agent
            .post(self.endpoint.as_str())
            .header("Content-Type", "application/json")
            .send(&body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .with_context(|| format!("Search request to {} failed", self.endpoint))?;

        let response: SearchResponse =
            serde_json::from_str(&response_text).context("Failed to parse search response")?;

        let hits = match response {
            SearchResponse::Hits(hits) | SearchResponse::Wrapped { documents: hits } => hits,
        };

        Ok(hits.into_iter().take(k).map(Document::from).collect())
    }
}

#[async_trait]
impl Retriever for HttpSearchRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Document>> {
        let retriever = self.clone();
        let query = query.to_string();

        tokio::task::spawn_blocking(move || retriever.search(&query, k))
            .await
            .context("Search task panicked")?
    }
}

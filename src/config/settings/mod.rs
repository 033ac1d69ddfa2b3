#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

const APP_DIR_NAME: &str = ".restaurant-rag";
pub const HOME_ENV_VAR: &str = "RESTAURANT_RAG_HOME";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Connection to the Ollama server, shared by embedding and generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OllamaConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub embedding_model: String,
    pub batch_size: u32,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 11434,
            embedding_model: "nomic-embed-text".to_string(),
            batch_size: 16,
            timeout_secs: 120,
        }
    }
}

/// Generation settings sent with every completion request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub num_predict: u32,
    pub num_ctx: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub keep_alive: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "mistral".to_string(),
            num_predict: 256,
            num_ctx: 2048,
            temperature: 0.3,
            top_k: 20,
            top_p: 0.9,
            keep_alive: "10m".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    /// Spreadsheet holding one restaurant per row
    pub path: PathBuf,
    /// Sheet name, or a 0-based sheet index
    pub sheet: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Restaurants.xlsx"),
            sheet: "0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    /// Vector index directory, relative to the base directory unless absolute
    pub directory: PathBuf,
    pub table: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("restaurant_index"),
            table: "restaurants".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// `lancedb` for the local index, `http` for a remote search service
    pub backend: String,
    pub search_type: String,
    pub k: usize,
    pub per_doc_char_limit: usize,
    /// Search endpoint used by the `http` backend
    pub endpoint: Option<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: "lancedb".to_string(),
            search_type: "similarity".to_string(),
            k: 4,
            per_doc_char_limit: 600,
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("Invalid batch size: {0} (must be between 1 and 1000)")]
    InvalidBatchSize(u32),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid protocol: {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid timeout: {0} (must be between 1 and 3600 seconds)")]
    InvalidTimeout(u64),
    #[error("Invalid num_predict: {0} (must be between 1 and 32768)")]
    InvalidNumPredict(u32),
    #[error("Invalid num_ctx: {0} (must be between 256 and 131072)")]
    InvalidNumCtx(u32),
    #[error("Invalid temperature: {0} (must be between 0.0 and 2.0)")]
    InvalidTemperature(f32),
    #[error("Invalid top_k: {0} (must be greater than 0)")]
    InvalidTopK(u32),
    #[error("Invalid top_p: {0} (must be greater than 0.0 and at most 1.0)")]
    InvalidTopP(f32),
    #[error("Invalid keep_alive: {0} (cannot be empty)")]
    InvalidKeepAlive(String),
    #[error("Invalid table name: {0} (cannot be empty)")]
    InvalidTable(String),
    #[error("Invalid retrieval k: {0} (must be between 1 and 100)")]
    InvalidTopKDocuments(usize),
    #[error("Invalid per-document character limit: {0} (must be greater than 0)")]
    InvalidCharLimit(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// Default base directory: `$RESTAURANT_RAG_HOME`, else `~/.restaurant-rag`
    #[inline]
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        if let Some(dir) = std::env::var_os(HOME_ENV_VAR).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        dirs::home_dir()
            .map(|home| home.join(APP_DIR_NAME))
            .or_else(|| dirs::data_dir().map(|data| data.join("restaurant-rag")))
            .ok_or(ConfigError::DirectoryError)
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let config_dir = self.get_base_dir();

        fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Get the base directory for the application
    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ollama.validate()?;
        self.generation.validate()?;
        self.validate_index_config()?;
        self.validate_retrieval_config()?;
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort(self.server.port));
        }
        Ok(())
    }

    fn validate_index_config(&self) -> Result<(), ConfigError> {
        if self.index.table.trim().is_empty() {
            return Err(ConfigError::InvalidTable(self.index.table.clone()));
        }
        Ok(())
    }

    fn validate_retrieval_config(&self) -> Result<(), ConfigError> {
        let config = &self.retrieval;

        if !(1..=100).contains(&config.k) {
            return Err(ConfigError::InvalidTopKDocuments(config.k));
        }

        if config.per_doc_char_limit == 0 {
            return Err(ConfigError::InvalidCharLimit(config.per_doc_char_limit));
        }

        if let Some(endpoint) = &config.endpoint {
            Url::parse(endpoint).map_err(|_| ConfigError::InvalidUrl(endpoint.clone()))?;
        }

        Ok(())
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.get_base_dir().join("config.toml")
    }

    /// Get the path for the vector index directory
    #[inline]
    pub fn index_path(&self) -> PathBuf {
        if self.index.directory.is_absolute() {
            self.index.directory.clone()
        } else {
            self.get_base_dir().join(&self.index.directory)
        }
    }

    #[inline]
    pub fn ollama_url(&self) -> Result<Url, ConfigError> {
        self.ollama.ollama_url()
    }
}

impl OllamaConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol != "http" && self.protocol != "https" {
            return Err(ConfigError::InvalidProtocol(self.protocol.clone()));
        }

        self.ollama_url()?;

        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }

        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.embedding_model.clone()));
        }

        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }

        if !(1..=3600).contains(&self.timeout_secs) {
            return Err(ConfigError::InvalidTimeout(self.timeout_secs));
        }

        Ok(())
    }

    #[inline]
    pub fn ollama_url(&self) -> Result<Url, ConfigError> {
        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))
    }

    #[inline]
    pub fn set_protocol(&mut self, protocol: String) -> Result<(), ConfigError> {
        if protocol != "http" && protocol != "https" {
            return Err(ConfigError::InvalidProtocol(protocol));
        }
        self.protocol = protocol;
        Ok(())
    }

    #[inline]
    pub fn set_host(&mut self, host: String) -> Result<(), ConfigError> {
        let temp_config = OllamaConfig {
            host: host.clone(),
            ..self.clone()
        };
        temp_config.validate()?;
        self.host = host;
        Ok(())
    }

    #[inline]
    pub fn set_port(&mut self, port: u16) -> Result<(), ConfigError> {
        if port == 0 {
            return Err(ConfigError::InvalidPort(port));
        }
        self.port = port;
        Ok(())
    }

    #[inline]
    pub fn set_embedding_model(&mut self, model: String) -> Result<(), ConfigError> {
        if model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(model));
        }
        self.embedding_model = model;
        Ok(())
    }

    #[inline]
    pub fn set_batch_size(&mut self, batch_size: u32) -> Result<(), ConfigError> {
        if batch_size == 0 || batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(batch_size));
        }
        self.batch_size = batch_size;
        Ok(())
    }
}

impl GenerationConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if !(1..=32768).contains(&self.num_predict) {
            return Err(ConfigError::InvalidNumPredict(self.num_predict));
        }

        if !(256..=131_072).contains(&self.num_ctx) {
            return Err(ConfigError::InvalidNumCtx(self.num_ctx));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }

        if self.top_k == 0 {
            return Err(ConfigError::InvalidTopK(self.top_k));
        }

        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(ConfigError::InvalidTopP(self.top_p));
        }

        if self.keep_alive.trim().is_empty() {
            return Err(ConfigError::InvalidKeepAlive(self.keep_alive.clone()));
        }

        Ok(())
    }

    #[inline]
    pub fn set_model(&mut self, model: String) -> Result<(), ConfigError> {
        if model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(model));
        }
        self.model = model;
        Ok(())
    }
}

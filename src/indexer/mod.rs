// Indexer module
// One-shot build of the vector index from the restaurant dataset

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::database::{EmbeddingRecord, VectorStore};
use crate::dataset::{Dataset, Document, SheetSelector};
use crate::embeddings::Embedder;
use crate::{RagError, Result};

/// Result of an index build request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The index directory was already present, nothing was inserted
    AlreadyBuilt { path: PathBuf },
    /// A fresh index was written with this many documents
    Built { documents: usize },
}

/// Embeds every dataset row and persists it to the vector index
pub struct IndexBuilder {
    index_path: PathBuf,
    table: String,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    show_progress: bool,
}

impl IndexBuilder {
    #[inline]
    pub fn new(config: &Config, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index_path: config.index_path(),
            table: config.index.table.clone(),
            embedder,
            batch_size: (config.ollama.batch_size as usize).max(1),
            show_progress: console::user_attended_stderr(),
        }
    }

    #[inline]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    #[inline]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// The presence of the index directory is what marks a completed build
    #[inline]
    pub fn index_exists(&self) -> bool {
        self.index_path.exists()
    }

    /// Remove a previously built index so the next build starts fresh
    #[inline]
    pub fn clear(&self) -> Result<()> {
        if self.index_exists() {
            warn!("Removing existing index at {}", self.index_path.display());
            std::fs::remove_dir_all(&self.index_path)?;
        }
        Ok(())
    }

    /// Load the dataset and build the index, unless it already exists.
    ///
    /// The workbook is not opened when the index is already present.
    #[inline]
    pub async fn build(&self, dataset_path: &Path, sheet: &SheetSelector) -> Result<BuildOutcome> {
        if self.index_exists() {
            return Ok(self.already_built());
        }

        let dataset = Dataset::load(dataset_path, sheet)?;
        info!(
            "Loaded {} rows with columns {:?} from {}",
            dataset.len(),
            dataset.columns,
            dataset_path.display()
        );

        self.build_from_dataset(&dataset).await
    }

    /// Build the index from rows already in memory
    #[inline]
    pub async fn build_from_dataset(&self, dataset: &Dataset) -> Result<BuildOutcome> {
        if self.index_exists() {
            return Ok(self.already_built());
        }

        if dataset.is_empty() {
            warn!("Dataset has no rows, nothing to index");
            return Ok(BuildOutcome::Built { documents: 0 });
        }

        let documents: Vec<Document> = dataset
            .records
            .iter()
            .map(|record| Document::from_record(record, &dataset.columns))
            .collect();

        let vectors = self.embed_all(&documents).await?;

        let records: Vec<EmbeddingRecord> = documents
            .into_iter()
            .zip(vectors)
            .map(|(document, vector)| EmbeddingRecord { document, vector })
            .collect();

        let store = VectorStore::create(&self.index_path, &self.table).await?;
        store.add_documents(&records).await?;

        info!(
            "Indexed {} documents into {}",
            records.len(),
            self.index_path.display()
        );
        Ok(BuildOutcome::Built {
            documents: records.len(),
        })
    }

    async fn embed_all(&self, documents: &[Document]) -> Result<Vec<Vec<f32>>> {
        let bar = self.progress_bar(documents.len());
        let mut vectors = Vec::with_capacity(documents.len());

        for batch in documents.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|doc| doc.text.clone()).collect();
            debug!("Embedding batch of {} documents", texts.len());

            let batch_vectors = self
                .embedder
                .embed_documents(&texts)
                .await
                .map_err(|e| RagError::Embedding(format!("{:#}", e)))?;

            if batch_vectors.len() != texts.len() {
                return Err(RagError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    texts.len(),
                    batch_vectors.len()
                )));
            }

            vectors.extend(batch_vectors);
            bar.inc(batch.len() as u64);
        }

        bar.finish_and_clear();
        Ok(vectors)
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} [{pos}/{len}] Embedding restaurants")
        {
            bar.set_style(style);
        }
        bar
    }

    fn already_built(&self) -> BuildOutcome {
        info!(
            "Index already exists at {}, skipping build",
            self.index_path.display()
        );
        BuildOutcome::AlreadyBuilt {
            path: self.index_path.clone(),
        }
    }
}

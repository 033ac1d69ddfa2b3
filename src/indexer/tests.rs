use super::*;
use crate::dataset::CellValue;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Hashes text length into a 3-d vector and counts the batches it sees
#[derive(Default)]
struct CountingEmbedder {
    batches: AtomicUsize,
    texts: AtomicUsize,
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| vec![text.len() as f32, 1.0, 0.0])
            .collect())
    }

    async fn embed_query(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(vec![text.len() as f32, 1.0, 0.0])
    }
}

struct ShortEmbedder;

#[async_trait]
impl Embedder for ShortEmbedder {
    async fn embed_documents(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(vec![vec![1.0, 0.0]])
    }

    async fn embed_query(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }
}

fn test_config(temp_dir: &TempDir, batch_size: u32) -> Config {
    let mut config = Config::load(temp_dir.path()).expect("defaults load");
    config.ollama.batch_size = batch_size;
    config
}

fn restaurants(count: usize) -> Dataset {
    let header = vec!["Restaurant".to_string(), "Location".to_string()];
    let rows = (0..count)
        .map(|i| {
            vec![
                CellValue::Text(format!("Restaurant {}", i)),
                CellValue::Text("Downtown".to_string()),
            ]
        })
        .collect();
    Dataset::from_rows(&header, rows)
}

#[tokio::test]
async fn build_embeds_in_batches_and_stores_every_row() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config(&temp_dir, 2);
    let embedder = Arc::new(CountingEmbedder::default());
    let builder = IndexBuilder::new(&config, embedder.clone()).with_progress(false);

    let outcome = builder
        .build_from_dataset(&restaurants(5))
        .await
        .expect("build succeeds");

    assert_eq!(outcome, BuildOutcome::Built { documents: 5 });
    assert_eq!(embedder.batches.load(Ordering::SeqCst), 3);
    assert_eq!(embedder.texts.load(Ordering::SeqCst), 5);

    let store = VectorStore::new(&config).await.expect("store opens");
    assert_eq!(store.count_documents().await.expect("can count"), 5);
}

#[tokio::test]
async fn second_build_inserts_nothing() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config(&temp_dir, 16);
    let embedder = Arc::new(CountingEmbedder::default());
    let builder = IndexBuilder::new(&config, embedder.clone()).with_progress(false);

    builder
        .build_from_dataset(&restaurants(3))
        .await
        .expect("first build succeeds");
    let outcome = builder
        .build_from_dataset(&restaurants(3))
        .await
        .expect("second build succeeds");

    assert_eq!(
        outcome,
        BuildOutcome::AlreadyBuilt {
            path: config.index_path()
        }
    );
    assert_eq!(embedder.texts.load(Ordering::SeqCst), 3);

    let store = VectorStore::new(&config).await.expect("store opens");
    assert_eq!(store.count_documents().await.expect("can count"), 3);
}

#[tokio::test]
async fn existing_index_skips_loading_the_workbook() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config(&temp_dir, 16);
    std::fs::create_dir_all(config.index_path()).expect("index dir created");

    let builder =
        IndexBuilder::new(&config, Arc::new(CountingEmbedder::default())).with_progress(false);
    let outcome = builder
        .build(Path::new("/nonexistent/Restaurants.xlsx"), &SheetSelector::default())
        .await
        .expect("no workbook needed");

    assert!(matches!(outcome, BuildOutcome::AlreadyBuilt { .. }));
}

#[tokio::test]
async fn missing_workbook_fails_the_build() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config(&temp_dir, 16);
    let builder =
        IndexBuilder::new(&config, Arc::new(CountingEmbedder::default())).with_progress(false);

    let result = builder
        .build(Path::new("/nonexistent/Restaurants.xlsx"), &SheetSelector::default())
        .await;

    assert!(matches!(result, Err(RagError::Dataset(_))));
    assert!(!builder.index_exists());
}

#[tokio::test]
async fn empty_dataset_creates_nothing() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config(&temp_dir, 16);
    let embedder = Arc::new(CountingEmbedder::default());
    let builder = IndexBuilder::new(&config, embedder.clone()).with_progress(false);

    let outcome = builder
        .build_from_dataset(&restaurants(0))
        .await
        .expect("empty build succeeds");

    assert_eq!(outcome, BuildOutcome::Built { documents: 0 });
    assert_eq!(embedder.batches.load(Ordering::SeqCst), 0);
    assert!(!builder.index_exists());
}

#[tokio::test]
async fn clear_allows_a_rebuild() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config(&temp_dir, 16);
    let embedder = Arc::new(CountingEmbedder::default());
    let builder = IndexBuilder::new(&config, embedder.clone()).with_progress(false);

    builder
        .build_from_dataset(&restaurants(2))
        .await
        .expect("first build succeeds");
    builder.clear().expect("index removed");
    assert!(!builder.index_exists());

    let outcome = builder
        .build_from_dataset(&restaurants(4))
        .await
        .expect("rebuild succeeds");

    assert_eq!(outcome, BuildOutcome::Built { documents: 4 });
    let store = VectorStore::new(&config).await.expect("store opens");
    assert_eq!(store.count_documents().await.expect("can count"), 4);
}

#[tokio::test]
async fn embedding_count_mismatch_is_an_error() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config(&temp_dir, 16);
    let builder = IndexBuilder::new(&config, Arc::new(ShortEmbedder)).with_progress(false);

    let result = builder.build_from_dataset(&restaurants(3)).await;

    assert!(matches!(result, Err(RagError::Embedding(_))));
    assert!(!builder.index_exists());
}

#[tokio::test]
async fn opening_for_retrieval_before_build_leaves_build_intact() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config(&temp_dir, 16);

    let retriever = crate::rag::build_retriever(&config).await;
    assert!(retriever.is_err());

    let builder =
        IndexBuilder::new(&config, Arc::new(CountingEmbedder::default())).with_progress(false);
    let outcome = builder
        .build_from_dataset(&restaurants(3))
        .await
        .expect("build succeeds");

    assert_eq!(outcome, BuildOutcome::Built { documents: 3 });
    let store = VectorStore::new(&config).await.expect("store opens");
    assert_eq!(store.count_documents().await.expect("can count"), 3);
}

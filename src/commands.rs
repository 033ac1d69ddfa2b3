use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::database::VectorStore;
use crate::dataset::SheetSelector;
use crate::embeddings::OllamaEmbedder;
use crate::indexer::{BuildOutcome, IndexBuilder};
use crate::ollama::OllamaClient;
use crate::rag::RetrieverBackend;
use crate::server;

/// Build the vector index from the configured workbook
#[inline]
pub async fn build_index(
    config: &Config,
    dataset: Option<PathBuf>,
    sheet: Option<String>,
    force: bool,
) -> Result<BuildOutcome> {
    let dataset_path = dataset.unwrap_or_else(|| config.dataset.path.clone());
    let sheet: SheetSelector = sheet
        .as_deref()
        .unwrap_or(&config.dataset.sheet)
        .parse()
        .unwrap_or_default();

    let embedder =
        OllamaEmbedder::new(&config.ollama).context("Failed to initialize Ollama embedder")?;
    let builder = IndexBuilder::new(config, Arc::new(embedder));

    if force {
        builder.clear().context("Failed to remove existing index")?;
    }

    info!(
        "Building index from {} into {}",
        dataset_path.display(),
        builder.index_path().display()
    );
    let outcome = builder
        .build(&dataset_path, &sheet)
        .await
        .context("Index build failed")?;

    match &outcome {
        BuildOutcome::AlreadyBuilt { path } => {
            println!("✅ Index already exists at {}", path.display());
            println!("   Use --force to rebuild it");
        }
        BuildOutcome::Built { documents: 0 } => {
            println!("⚠️  The dataset has no rows; nothing was indexed");
        }
        BuildOutcome::Built { documents } => {
            println!(
                "✅ Indexed {} restaurants into {}",
                documents,
                builder.index_path().display()
            );
        }
    }

    Ok(outcome)
}

/// Run the HTTP server, with CLI overrides taking precedence over the config
#[inline]
pub async fn serve(config: &Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    server::serve(config, &host, port).await?;
    Ok(())
}

/// Answer one question and print the result
#[inline]
pub async fn ask(config: &Config, question: &str) -> Result<()> {
    let pipeline = server::build_pipeline(config).await?;
    let answer = pipeline.answer(question).await?;

    println!("{}", answer);
    Ok(())
}

/// Show configuration, index and Ollama health
#[inline]
pub async fn show_status(config: &Config) -> Result<()> {
    println!("📊 Restaurant RAG Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("⚙️  Configuration:");
    let config_path = config.config_file_path();
    if config_path.exists() {
        println!("   📄 File: {}", config_path.display());
    } else {
        println!("   📄 File: {} (not saved, using defaults)", config_path.display());
    }
    println!(
        "   📚 Dataset: {} (sheet {})",
        config.dataset.path.display(),
        config.dataset.sheet
    );
    match RetrieverBackend::from_config(&config.retrieval) {
        Ok(backend) => println!(
            "   🔎 Retriever: {:?}, k = {}, {} chars per document",
            backend, config.retrieval.k, config.retrieval.per_doc_char_limit
        ),
        Err(e) => println!("   ❌ Retriever: {}", e),
    }

    println!();
    println!("🔍 Vector Index:");
    let index_path = config.index_path();
    if index_path.exists() {
        match VectorStore::new(config).await {
            Ok(store) => match store.validate_integrity().await {
                Ok(true) => {
                    let count = store.count_documents().await?;
                    println!("   ✅ LanceDB: {} ({} documents)", index_path.display(), count);
                }
                Ok(false) => {
                    println!(
                        "   ⚠️  LanceDB: table '{}' missing or unreadable",
                        store.table_name()
                    );
                    println!("   Run `restaurant-rag build --force` to rebuild it");
                }
                Err(e) => println!("   ⚠️  LanceDB: unreadable - {}", e),
            },
            Err(e) => println!("   ❌ LanceDB: Failed to open - {}", e),
        }
    } else {
        println!("   💤 Not built yet ({})", index_path.display());
        println!("   Run `restaurant-rag build` to create it");
    }

    println!();
    println!("🤖 Ollama Status:");
    match OllamaClient::new(&config.ollama) {
        Ok(client) => {
            let client = client.with_retry_attempts(1);
            let models = [
                config.ollama.embedding_model.clone(),
                config.generation.model.clone(),
            ];
            let result = tokio::task::spawn_blocking(move || {
                let names: Vec<&str> = models.iter().map(String::as_str).collect();
                client.health_check(&names)
            })
            .await
            .context("Health check task panicked")?;
            match result {
                Ok(()) => {
                    println!(
                        "   ✅ Ollama: Connected ({}:{})",
                        config.ollama.host, config.ollama.port
                    );
                    println!("   📋 Embedding model: {}", config.ollama.embedding_model);
                    println!("   💬 Chat model: {}", config.generation.model);
                }
                Err(e) => {
                    warn!("Ollama health check failed: {:#}", e);
                    println!("   ⚠️  Ollama: Unhealthy - {:#}", e);
                }
            }
        }
        Err(e) => {
            println!("   ❌ Ollama: Invalid settings - {}", e);
        }
    }

    Ok(())
}

// LanceDB vector database module
// Handles vector storage and similarity search for restaurant documents

#[cfg(test)]
mod tests;

pub mod vector_store;

use serde::{Deserialize, Serialize};

use crate::dataset::Document;

pub use vector_store::{SearchResult, VectorStore};

/// Document and its embedding, as stored in LanceDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// The document; its id doubles as the row id in the table
    pub document: Document,
    /// The vector embedding of the document text
    pub vector: Vec<f32>,
}

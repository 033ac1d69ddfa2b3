// Database module
// LanceDB-backed vector index for restaurant documents

pub mod lancedb;

pub use lancedb::{EmbeddingRecord, SearchResult, VectorStore};

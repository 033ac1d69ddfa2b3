
use super::EmbeddingRecord;
use crate::dataset::Document;
use crate::{RagError, config::Config};
use arrow::array::{Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection, Table,
    query::{ExecutableQuery, QueryBase},
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Vector database store using LanceDB for similarity search
pub struct VectorStore {
    connection: Connection,
    table_name: String,
}

/// Search result from vector similarity search
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub document: Document,
    pub distance: f32,
}

impl VectorStore {
    /// Open the already-built vector store configured for this application
    #[inline]
    pub async fn new(config: &Config) -> Result<Self, RagError> {
        Self::open(&config.index_path(), &config.index.table).await
    }

    /// Open an existing LanceDB directory and bind to one table.
    ///
    /// Never creates the directory; its presence marks a completed build.
    ///
    /// # Arguments
    /// * `db_path` - Directory holding the LanceDB data
    /// * `table_name` - Table storing the documents
    #[inline]
    pub async fn open(db_path: &Path, table_name: &str) -> Result<Self, RagError> {
        if !db_path.is_dir() {
            return Err(RagError::Database(format!(
                "No vector index at {}; build the index first",
                db_path.display()
            )));
        }
        Self::connect(db_path, table_name).await
    }

    /// Create the LanceDB directory if needed and bind to one table
    #[inline]
    pub async fn create(db_path: &Path, table_name: &str) -> Result<Self, RagError> {
        debug!("Initializing LanceDB at path: {:?}", db_path);

        std::fs::create_dir_all(db_path).map_err(|e| {
            RagError::Database(format!("Failed to create vector database directory: {}", e))
        })?;

        Self::connect(db_path, table_name).await
    }

    async fn connect(db_path: &Path, table_name: &str) -> Result<Self, RagError> {
        let uri = db_path.display().to_string();
        let connection = lancedb::connect(&uri).execute().await.map_err(|e| {
            error!("Failed to connect to LanceDB: {}", e);
            RagError::Database(format!("Failed to connect to LanceDB: {}", e))
        })?;

        info!("Vector store opened at {}", uri);
        Ok(Self {
            connection,
            table_name: table_name.to_string(),
        })
    }

    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Whether the documents table has been created
    #[inline]
    pub async fn table_exists(&self) -> Result<bool, RagError> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to list tables: {}", e)))?;

        Ok(table_names.contains(&self.table_name))
    }

    async fn open_table(&self) -> Result<Table, RagError> {
        self.connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to open table: {}", e)))
    }

    /// Create schema with the specified vector dimension
    fn create_schema(vector_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    vector_dim as i32,
                ),
                false,
            ),
            Field::new("text", DataType::Utf8, false),
            Field::new("metadata", DataType::Utf8, false),
        ]))
    }

    /// Store documents with their embeddings.
    ///
    /// The table is created on first insert, sized to the dimension of the
    /// first vector; every vector in the batch must share that dimension.
    ///
    /// # Arguments
    /// * `records` - Documents and vectors to store
    #[inline]
    pub async fn add_documents(&self, records: &[EmbeddingRecord]) -> Result<(), RagError> {
        if records.is_empty() {
            debug!("No documents to store");
            return Ok(());
        }

        debug!("Storing batch of {} documents", records.len());

        let vector_dim = records[0].vector.len();
        if vector_dim == 0 {
            return Err(RagError::Database("Cannot store empty vectors".to_string()));
        }

        if !self.table_exists().await? {
            info!(
                "Creating table {} with {} dimensions",
                self.table_name, vector_dim
            );
            self.connection
                .create_empty_table(&self.table_name, Self::create_schema(vector_dim))
                .execute()
                .await
                .map_err(|e| RagError::Database(format!("Failed to create table: {}", e)))?;
        }

        let record_batch = Self::create_record_batch(records, vector_dim)?;
        let table = self.open_table().await?;

        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to insert documents: {}", e)))?;

        info!("Successfully stored {} documents", records.len());
        Ok(())
    }

    /// Create a RecordBatch from embedding records
    fn create_record_batch(
        records: &[EmbeddingRecord],
        vector_dim: usize,
    ) -> Result<RecordBatch, RagError> {
        let len = records.len();

        let mut ids = Vec::with_capacity(len);
        let mut texts = Vec::with_capacity(len);
        let mut metadata = Vec::with_capacity(len);
        let mut flat_values = Vec::with_capacity(len * vector_dim);

        for record in records {
            if record.vector.len() != vector_dim {
                return Err(RagError::Database(format!(
                    "Vector dimension mismatch for document {}: expected {}, got {}",
                    record.document.id,
                    vector_dim,
                    record.vector.len()
                )));
            }
            ids.push(record.document.id.as_str());
            texts.push(record.document.text.as_str());
            metadata.push(
                serde_json::to_string(&record.document.metadata).map_err(|e| {
                    RagError::Database(format!("Failed to serialize metadata: {}", e))
                })?,
            );
            flat_values.extend_from_slice(&record.vector);
        }

        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, true));
        let vector_array =
            FixedSizeListArray::try_new(field, vector_dim as i32, Arc::new(values_array), None)
                .map_err(|e| {
                    RagError::Database(format!("Failed to create vector array: {}", e))
                })?;

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(texts)),
            Arc::new(StringArray::from(metadata)),
        ];

        RecordBatch::try_new(Self::create_schema(vector_dim), arrays)
            .map_err(|e| RagError::Database(format!("Failed to create record batch: {}", e)))
    }

    /// Search for the nearest documents to a query vector, closest first
    ///
    /// # Arguments
    /// * `query_vector` - The query vector to search for
    /// * `limit` - Maximum number of results to return
    #[inline]
    pub async fn search_similar(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, RagError> {
        debug!("Searching for similar vectors with limit: {}", limit);

        if !self.table_exists().await? {
            return Err(RagError::Database(format!(
                "Table '{}' does not exist; build the index first",
                self.table_name
            )));
        }

        let table = self.open_table().await?;

        let results = table
            .vector_search(query_vector)
            .map_err(|e| RagError::Database(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .limit(limit)
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to execute search: {}", e)))?;

        let mut search_results = Self::parse_search_results_stream(results).await?;
        search_results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(search_results)
    }

    /// Parse search results from LanceDB stream into SearchResult structs
    async fn parse_search_results_stream(
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<SearchResult>, RagError> {
        let mut search_results = Vec::new();

        while let Some(batch_result) = results
            .try_next()
            .await
            .map_err(|e| RagError::Database(format!("Failed to read result stream: {}", e)))?
        {
            search_results.extend(Self::parse_search_batch(&batch_result)?);
        }

        debug!("Parsed {} search results from stream", search_results.len());
        Ok(search_results)
    }

    fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, RagError> {
        batch
            .column_by_name(name)
            .ok_or_else(|| RagError::Database(format!("Missing {} column", name)))?
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| RagError::Database(format!("Invalid {} column type", name)))
    }

    /// Parse a single record batch from search results
    fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<SearchResult>, RagError> {
        let ids = Self::string_column(batch, "id")?;
        let texts = Self::string_column(batch, "text")?;
        let metadata = Self::string_column(batch, "metadata")?;

        let distances = batch
            .column_by_name("_distance")
            .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

        let mut search_results = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            let metadata = serde_json::from_str(metadata.value(row)).unwrap_or_else(|e| {
                warn!("Ignoring unreadable metadata for row {}: {}", ids.value(row), e);
                serde_json::Map::new()
            });

            let distance = distances.map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

            search_results.push(SearchResult {
                document: Document::new(ids.value(row), texts.value(row), metadata),
                distance,
            });
        }

        Ok(search_results)
    }

    /// Get the total number of documents stored; zero before the first build
    #[inline]
    pub async fn count_documents(&self) -> Result<u64, RagError> {
        if !self.table_exists().await? {
            return Ok(0);
        }

        let count = self
            .open_table()
            .await?
            .count_rows(None)
            .await
            .map_err(|e| RagError::Database(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    /// Validate database integrity
    ///
    /// # Returns
    /// * `Result<bool, RagError>` - True if the table exists and is readable
    #[inline]
    pub async fn validate_integrity(&self) -> Result<bool, RagError> {
        debug!("Validating database integrity");

        match self.table_exists().await {
            Ok(true) => {}
            Ok(false) => {
                warn!("Documents table missing during integrity check");
                return Ok(false);
            }
            Err(e) => {
                error!("Failed to list tables during integrity check: {}", e);
                return Ok(false);
            }
        }

        match self.open_table().await {
            Ok(table) => match table.count_rows(None).await {
                Ok(count) => {
                    debug!("Database integrity check passed, {} rows found", count);
                    Ok(true)
                }
                Err(e) => {
                    error!("Failed to count rows during integrity check: {}", e);
                    Ok(false)
                }
            },
            Err(e) => {
                error!("Failed to open table during integrity check: {}", e);
                Ok(false)
            }
        }
    }
}

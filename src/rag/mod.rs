//! Retrieval-augmented answering
//!
//! Retrieval, context assembly, prompt rendering and the pipeline that
//! sequences them for a single question.

pub mod context;
pub mod errors;
pub mod pipeline;
pub mod prompt;
pub mod retriever;

pub use context::{DEFAULT_PER_DOC_CHAR_LIMIT, format_docs};
pub use errors::ChatError;
pub use pipeline::ChatPipeline;
pub use prompt::{CONCIERGE_TEMPLATE, PromptTemplate};
pub use retriever::{
    HttpSearchRetriever, Retriever, RetrieverBackend, VectorStoreRetriever, build_retriever,
};

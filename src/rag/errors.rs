use thiserror::Error;

use crate::RagError;

/// Failure kinds of a single chat turn
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Please provide a question")]
    EmptyQuestion,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported retriever: {0}")]
    RetrieverUnsupported(String),

    #[error("{collaborator} failed: {error:#}")]
    CollaboratorFailure {
        collaborator: &'static str,
        error: anyhow::Error,
    },
}

impl ChatError {
    /// Classify a collaborator error, keeping retriever misconfiguration distinct
    #[inline]
    pub fn from_collaborator(collaborator: &'static str, error: anyhow::Error) -> Self {
        match error.downcast_ref::<RagError>() {
            Some(RagError::RetrieverUnsupported(reason)) => {
                Self::RetrieverUnsupported(reason.clone())
            }
            _ => Self::CollaboratorFailure {
                collaborator,
                error,
            },
        }
    }
}


use std::sync::Arc;
use tracing::{debug, info};

use super::context::format_docs;
use super::errors::ChatError;
use super::prompt::PromptTemplate;
use super::retriever::Retriever;
use crate::config::RetrievalConfig;
use crate::llm::LanguageModel;

/// Answers one question: retrieve, format, render, generate
pub struct ChatPipeline {
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn LanguageModel>,
    template: PromptTemplate,
    k: usize,
    per_doc_char_limit: usize,
}

impl ChatPipeline {
    #[inline]
    pub fn new(
        retriever: Arc<dyn Retriever>,
        llm: Arc<dyn LanguageModel>,
        retrieval: &RetrievalConfig,
    ) -> Self {
        Self {
            retriever,
            llm,
            template: PromptTemplate::concierge(),
            k: retrieval.k,
            per_doc_char_limit: retrieval.per_doc_char_limit,
        }
    }

    /// Produce the model's answer to `question`, returned unmodified.
    ///
    /// A blank question is rejected before the retriever is touched.
    #[inline]
    pub async fn answer(&self, question: &str) -> Result<String, ChatError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::EmptyQuestion);
        }

        info!("Received question: {}", question);

        let documents = self
            .retriever
            .retrieve(question, self.k)
            .await
            .map_err(|e| ChatError::from_collaborator("retriever", e))?;
        debug!("Retrieved {} documents", documents.len());

        let context = format_docs(&documents, self.per_doc_char_limit);
        let prompt = self.template.render(&context, question);
        debug!("Rendered prompt of {} characters", prompt.len());

        let answer = self
            .llm
            .generate(&prompt)
            .await
            .map_err(|e| ChatError::from_collaborator("language model", e))?;

        info!("Generated answer of {} characters", answer.len());
        Ok(answer)
    }
}

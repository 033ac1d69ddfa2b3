use serde::{Deserialize, Serialize};

pub const EMPTY_QUESTION_MESSAGE: &str = "Please provide a question";
pub const GENERIC_ERROR_MESSAGE: &str =
    "Sorry, there was an error processing your question. Please try again.";

/// Body of `POST /chat`; `message` is accepted from older clients
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    /// The trimmed question, preferring `question` over `message` when both are usable
    #[inline]
    pub fn question(&self) -> &str {
        [self.question.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|q| !q.is_empty())
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: String,
}

impl ChatResponse {
    #[inline]
    pub fn success(response: String) -> Self {
        Self {
            response,
            status: "success".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    #[inline]
    pub fn empty_question() -> Self {
        Self {
            error: EMPTY_QUESTION_MESSAGE.to_string(),
            status: None,
            detail: None,
        }
    }

    #[inline]
    pub fn internal(detail: String) -> Self {
        Self {
            error: GENERIC_ERROR_MESSAGE.to_string(),
            status: Some("error".to_string()),
            detail: Some(detail),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

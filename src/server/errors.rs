use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use super::types::ErrorResponse;
use crate::rag::ChatError;

impl IntoResponse for ChatError {
    #[inline]
    fn into_response(self) -> Response {
        match &self {
            ChatError::EmptyQuestion => {
                warn!("Rejected chat request without a question");
                return (StatusCode::BAD_REQUEST, Json(ErrorResponse::empty_question()))
                    .into_response();
            }
            ChatError::InvalidRequest(reason) => {
                warn!("Rejected malformed chat request: {}", reason);
                return (StatusCode::BAD_REQUEST, Json(ErrorResponse::empty_question()))
                    .into_response();
            }
            ChatError::RetrieverUnsupported(reason) => {
                error!("Retriever is not usable: {}", reason);
            }
            ChatError::CollaboratorFailure {
                collaborator,
                error,
            } => {
                error!("Error processing question: {} failed: {:?}", collaborator, error);
            }
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal(self.to_string())),
        )
            .into_response()
    }
}

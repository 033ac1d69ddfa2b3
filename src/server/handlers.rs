use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{Html, IntoResponse, Response};

use super::types::{ChatRequest, ChatResponse, HealthResponse};
use crate::rag::{ChatError, ChatPipeline};

const INDEX_PAGE: &str = include_str!("../../static/index.html");

/// Shared per-process state, built once at startup and never mutated
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
}

impl AppState {
    #[inline]
    pub fn new(pipeline: ChatPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// GET /
#[inline]
pub async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// GET /health
#[inline]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /chat
#[inline]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return ChatError::InvalidRequest(rejection.body_text()).into_response(),
    };

    match state.pipeline.answer(request.question()).await {
        Ok(answer) => Json(ChatResponse::success(answer)).into_response(),
        Err(e) => e.into_response(),
    }
}

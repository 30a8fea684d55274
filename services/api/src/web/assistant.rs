//! services/api/src/web/assistant.rs
//!
//! The educational assistant endpoint. It always answers 200; provider
//! failures come back as a localized apology.

use axum::{extract::State, Json};
use pocket_tutor_core::assistant::EDUCATIONAL_CONTEXT;
use pocket_tutor_core::localization::ARABIC;
use pocket_tutor_core::AssistantRequest;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::extract::ApiJson;
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
    /// `ar`, `en` or `ur`. Defaults to `ar`.
    pub language: Option<String>,
    /// Defaults to `educational_assistant`.
    pub context: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
    pub language: String,
}

#[utoipa::path(
    post,
    path = "/api/ai-chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply or localized fallback", body = ChatResponse)
    ),
    tag = "Assistant"
)]
pub async fn ai_chat_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Json<ChatResponse> {
    let reply = state
        .assistant
        .chat(AssistantRequest {
            message: req.message,
            language: req.language.unwrap_or_else(|| ARABIC.to_string()),
            context: req.context.unwrap_or_else(|| EDUCATIONAL_CONTEXT.to_string()),
        })
        .await;
    Json(ChatResponse { response: reply.response, language: reply.language })
}

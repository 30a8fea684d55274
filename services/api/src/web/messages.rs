//! services/api/src/web/messages.rs
//!
//! Direct messages and the conversation view.

use axum::{
    extract::State,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use pocket_tutor_core::domain::{Conversation, Identity, Message, NewMessage, UserRole};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::extract::{ApiJson, ApiPath};
use crate::web::sessions::parse_field;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,
    /// `student` or `teacher`.
    pub receiver_type: String,
    pub message: String,
    /// Defaults to `text`.
    pub message_type: Option<String>,
}

#[derive(Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_type: String,
    pub receiver_id: Uuid,
    pub receiver_type: String,
    pub message: String,
    pub message_type: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            sender_type: message.sender_role.to_string(),
            receiver_id: message.receiver_id,
            receiver_type: message.receiver_role.to_string(),
            message: message.body,
            message_type: message.message_type,
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub counterpart_id: Uuid,
    /// Newest first.
    pub messages: Vec<MessageResponse>,
    pub last_message: MessageResponse,
    pub unread_count: u64,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            counterpart_id: conversation.counterpart_id,
            messages: conversation.messages.into_iter().map(MessageResponse::from).collect(),
            last_message: conversation.last_message.into(),
            unread_count: conversation.unread_count,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkConversationReadResponse {
    pub message: String,
    pub updated_count: u64,
}

//=========================================================================================
// Handlers
//=========================================================================================

#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message stored; the receiver is notified", body = MessageResponse),
        (status = 400, description = "Empty or oversized message, or unknown receiver type")
    ),
    security(("bearer" = [])),
    tag = "Messages"
)]
pub async fn send_message_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let receiver_role: UserRole = parse_field("receiverType", &req.receiver_type)?;
    let message = state
        .messaging
        .send_message(
            identity,
            NewMessage {
                receiver_id: req.receiver_id,
                receiver_role,
                body: req.message,
                message_type: req.message_type,
            },
        )
        .await?;
    Ok(Json(message.into()))
}

#[utoipa::path(
    get,
    path = "/api/messages/conversations",
    responses(
        (status = 200, description = "One entry per counterpart, most recent first", body = [ConversationResponse])
    ),
    security(("bearer" = [])),
    tag = "Messages"
)]
pub async fn conversations_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<ConversationResponse>>, ApiError> {
    let conversations = state.messaging.conversations(identity).await?;
    Ok(Json(conversations.into_iter().map(ConversationResponse::from).collect()))
}

#[utoipa::path(
    put,
    path = "/api/messages/conversations/{counterpartId}/read",
    params(("counterpartId" = Uuid, Path, description = "The other participant")),
    responses(
        (status = 200, description = "Messages from the counterpart marked read", body = MarkConversationReadResponse)
    ),
    security(("bearer" = [])),
    tag = "Messages"
)]
pub async fn mark_conversation_read_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiPath(counterpart_id): ApiPath<Uuid>,
) -> Result<Json<MarkConversationReadResponse>, ApiError> {
    let updated_count = state
        .messaging
        .mark_conversation_read(identity, counterpart_id)
        .await?;
    info!(user_id = %identity.user_id, counterpart_id = %counterpart_id, updated_count, "Conversation marked read");
    Ok(Json(MarkConversationReadResponse {
        message: "Conversation marked as read".to_string(),
        updated_count,
    }))
}

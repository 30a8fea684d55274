//! services/api/src/web/notifications.rs
//!
//! The caller's notification inbox.

use axum::{
    extract::State,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use pocket_tutor_core::domain::{Identity, LocalizedText, Notification};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::extract::{ApiPath, ApiQuery};
use crate::web::rest::AckResponse;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationListParams {
    /// Defaults to 50.
    pub limit: Option<usize>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_type: String,
    pub notification_type: String,
    /// Language code to text.
    #[schema(value_type = Object)]
    pub title: LocalizedText,
    #[schema(value_type = Object)]
    pub message: LocalizedText,
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            user_id: notification.user_id,
            user_type: notification.user_role.to_string(),
            notification_type: notification.kind.to_string(),
            title: notification.title,
            message: notification.message,
            data: notification.data,
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationListParams),
    responses(
        (status = 200, description = "Newest first", body = [NotificationResponse])
    ),
    security(("bearer" = [])),
    tag = "Notifications"
)]
pub async fn list_notifications_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiQuery(params): ApiQuery<NotificationListParams>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let notifications = state.notifications.list(identity.user_id, params.limit).await?;
    Ok(Json(notifications.into_iter().map(NotificationResponse::from).collect()))
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked read", body = AckResponse),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer" = [])),
    tag = "Notifications"
)]
pub async fn mark_notification_read_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiPath(notification_id): ApiPath<Uuid>,
) -> Result<Json<AckResponse>, ApiError> {
    state.notifications.mark_read(notification_id, identity.user_id).await?;
    Ok(Json(AckResponse::new("Notification marked as read")))
}

#[utoipa::path(
    put,
    path = "/api/notifications/mark-all-read",
    responses(
        (status = 200, description = "All marked read", body = AckResponse)
    ),
    security(("bearer" = [])),
    tag = "Notifications"
)]
pub async fn mark_all_notifications_read_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<AckResponse>, ApiError> {
    state.notifications.mark_all_read(identity.user_id).await?;
    Ok(Json(AckResponse::new("All notifications marked as read")))
}

//! services/api/src/web/sessions.rs
//!
//! Tutoring session endpoints: booking a session with a teacher, listing the
//! caller's sessions and moving a session through its statuses.

use axum::{
    extract::State,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use pocket_tutor_core::domain::{
    Identity, NewSession, Session, SessionStatus, SessionType, UserRole,
};
use pocket_tutor_core::ports::{PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::extract::{ApiJson, ApiPath};
use crate::web::middleware::require_role;
use crate::web::rest::AckResponse;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub teacher_id: Uuid,
    pub subject: String,
    /// `individual` or `group`.
    pub session_type: String,
    /// Free text, usually `YYYY-MM-DD`.
    pub date: String,
    /// Free text, usually `HH:MM`.
    pub time: String,
    /// Minutes, 30 to 180. Defaults to 60.
    pub duration: Option<i32>,
    pub max_students: Option<i32>,
    pub price: f64,
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateSessionStatusRequest {
    /// One of `pending`, `confirmed`, `completed`, `cancelled`.
    pub status: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    pub subject: String,
    pub session_type: String,
    pub date: String,
    pub time: String,
    pub duration: i32,
    pub max_students: i32,
    pub price: f64,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            teacher_id: session.teacher_id,
            student_id: session.student_id,
            subject: session.subject,
            session_type: session.session_type.to_string(),
            date: session.date,
            time: session.time,
            duration: session.duration_minutes,
            max_students: session.max_students,
            price: session.price,
            notes: session.notes,
            status: session.status.to_string(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

/// Parses a wire enum value, reporting an unknown one as a validation failure.
pub(crate) fn parse_field<T: FromStr<Err = String>>(field: &str, value: &str) -> PortResult<T> {
    value
        .parse::<T>()
        .map_err(|e| PortError::Validation(format!("{}: {}", field, e)))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Book a session with a teacher. The teacher is notified.
#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session created with status pending", body = SessionResponse),
        (status = 400, description = "Invalid field"),
        (status = 403, description = "Caller is not a student"),
        (status = 404, description = "Teacher not found")
    ),
    security(("bearer" = [])),
    tag = "Sessions"
)]
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<CreateSessionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let student_id = require_role(&identity, UserRole::Student)?;
    let session_type: SessionType = parse_field("sessionType", &req.session_type)?;

    let session = state
        .sessions
        .create_session(
            student_id,
            NewSession {
                teacher_id: req.teacher_id,
                subject: req.subject,
                session_type,
                date: req.date,
                time: req.time,
                duration_minutes: req.duration,
                max_students: req.max_students,
                price: req.price,
                notes: req.notes,
            },
        )
        .await?;
    Ok(Json(session.into()))
}

/// Sessions where the caller is the student or the teacher, newest first.
#[utoipa::path(
    get,
    path = "/api/sessions/my-sessions",
    responses(
        (status = 200, description = "The caller's sessions", body = [SessionResponse])
    ),
    security(("bearer" = [])),
    tag = "Sessions"
)]
pub async fn my_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let sessions = state.sessions.list_my_sessions(identity).await?;
    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

/// Set a session's status. Only its student or its teacher may do this.
#[utoipa::path(
    put,
    path = "/api/sessions/{id}/status",
    request_body = UpdateSessionStatusRequest,
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Status updated", body = AckResponse),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Session not found")
    ),
    security(("bearer" = [])),
    tag = "Sessions"
)]
pub async fn update_session_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiPath(session_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateSessionStatusRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let status: SessionStatus = parse_field("status", &req.status)?;
    state.sessions.update_status(session_id, status, identity).await?;
    Ok(Json(AckResponse::new("Session status updated successfully")))
}

//! services/api/src/web/rest.rs
//!
//! Contains the shared REST payloads, the health endpoint and the master
//! definition for the OpenAPI specification.

use axum::response::Json;
use serde::Serialize;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::web::{assistant, auth, bookings, messages, notifications, ratings, sessions, teachers};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::student_signup_handler,
        auth::student_login_handler,
        auth::teacher_signup_handler,
        auth::teacher_login_handler,
        auth::logout_handler,
        auth::get_profile_handler,
        auth::update_profile_handler,
        auth::change_password_handler,
        bookings::create_booking_handler,
        bookings::list_bookings_handler,
        bookings::get_booking_handler,
        bookings::cancel_booking_handler,
        sessions::create_session_handler,
        sessions::my_sessions_handler,
        sessions::update_session_status_handler,
        ratings::create_rating_handler,
        ratings::teacher_ratings_handler,
        ratings::teacher_rating_stats_handler,
        teachers::dashboard_stats_handler,
        teachers::search_teachers_handler,
        messages::send_message_handler,
        messages::conversations_handler,
        messages::mark_conversation_read_handler,
        notifications::list_notifications_handler,
        notifications::mark_notification_read_handler,
        notifications::mark_all_notifications_read_handler,
        assistant::ai_chat_handler,
    ),
    components(
        schemas(
            AckResponse,
            auth::StudentSignupRequest,
            auth::TeacherSignupRequest,
            auth::LoginRequest,
            auth::ProfileUpdateRequest,
            auth::ChangePasswordRequest,
            auth::UserResponse,
            auth::TokenResponse,
            bookings::CreateBookingRequest,
            bookings::BookingResponse,
            sessions::CreateSessionRequest,
            sessions::UpdateSessionStatusRequest,
            sessions::SessionResponse,
            ratings::CreateRatingRequest,
            ratings::RatingResponse,
            ratings::TeacherRatingResponse,
            ratings::RatingStatsResponse,
            teachers::DashboardStatsResponse,
            teachers::TeacherSearchResult,
            messages::SendMessageRequest,
            messages::MessageResponse,
            messages::ConversationResponse,
            messages::MarkConversationReadResponse,
            notifications::NotificationResponse,
            assistant::ChatRequest,
            assistant::ChatResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Pocket Tutor API", description = "Tutoring marketplace: accounts, sessions, ratings, messages and notifications.")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

//=========================================================================================
// Shared Payloads
//=========================================================================================

/// A plain confirmation returned by mutations with nothing else to report.
#[derive(Serialize, ToSchema)]
pub struct AckResponse {
    pub message: String,
}

impl AckResponse {
    pub fn new(message: &str) -> Self {
        Self { message: message.to_string() }
    }
}

//=========================================================================================
// Health
//=========================================================================================

#[utoipa::path(
    get,
    path = "/api/",
    responses((status = 200, description = "Service is up", body = AckResponse)),
    tag = "Health"
)]
pub async fn health_handler() -> Json<AckResponse> {
    Json(AckResponse::new("Hello World"))
}

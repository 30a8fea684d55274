//! services/api/src/web/routes.rs
//!
//! Builds the HTTP router shared by the `api` binary and the integration tests.

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::web::{
    assistant, auth, bookings, messages, middleware::require_auth, notifications, ratings,
    rest::health_handler, sessions, state::AppState, teachers,
};

fn cors_layer(state: &AppState) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);
    match &state.config.cors_allowed_origin {
        Some(origin) => cors.allow_origin(origin.clone()).allow_credentials(true),
        None => cors.allow_origin(Any),
    }
}

/// Every route lives under `/api`. Protected routes run behind `require_auth`.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api", get(health_handler))
        .route("/api/", get(health_handler))
        .route("/api/students/signup", post(auth::student_signup_handler))
        .route("/api/students/login", post(auth::student_login_handler))
        .route("/api/teachers/signup", post(auth::teacher_signup_handler))
        .route("/api/teachers/login", post(auth::teacher_login_handler))
        .route("/api/teachers/search", get(teachers::search_teachers_handler))
        .route("/api/teachers/{id}/ratings", get(ratings::teacher_ratings_handler))
        .route(
            "/api/teachers/{id}/rating-stats",
            get(ratings::teacher_rating_stats_handler),
        )
        .route("/api/ai-chat", post(assistant::ai_chat_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/auth/logout", post(auth::logout_handler))
        .route(
            "/api/profile",
            get(auth::get_profile_handler).put(auth::update_profile_handler),
        )
        .route("/api/profile/change-password", post(auth::change_password_handler))
        .route(
            "/api/bookings",
            post(bookings::create_booking_handler).get(bookings::list_bookings_handler),
        )
        .route("/api/bookings/{id}", get(bookings::get_booking_handler))
        .route("/api/bookings/{id}/cancel", put(bookings::cancel_booking_handler))
        .route("/api/sessions", post(sessions::create_session_handler))
        .route("/api/sessions/my-sessions", get(sessions::my_sessions_handler))
        .route(
            "/api/sessions/{id}/status",
            put(sessions::update_session_status_handler),
        )
        .route("/api/ratings", post(ratings::create_rating_handler))
        .route("/api/teachers/dashboard-stats", get(teachers::dashboard_stats_handler))
        .route("/api/messages", post(messages::send_message_handler))
        .route("/api/messages/conversations", get(messages::conversations_handler))
        .route(
            "/api/messages/conversations/{counterpart_id}/read",
            put(messages::mark_conversation_read_handler),
        )
        .route("/api/notifications", get(notifications::list_notifications_handler))
        .route(
            "/api/notifications/{id}/read",
            put(notifications::mark_notification_read_handler),
        )
        .route(
            "/api/notifications/mark-all-read",
            put(notifications::mark_all_notifications_read_handler),
        )
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state))
        .with_state(state)
}

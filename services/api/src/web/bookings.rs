//! services/api/src/web/bookings.rs
//!
//! The simplified booking flow. Every lookup is filtered on the calling
//! student, so another student's booking answers exactly like a missing one.

use axum::{
    extract::State,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use pocket_tutor_core::domain::{Booking, Identity, NewBooking, SessionType, UserRole};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::extract::{ApiJson, ApiPath};
use crate::web::middleware::require_role;
use crate::web::rest::AckResponse;
use crate::web::sessions::parse_field;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub tutor_id: Uuid,
    pub subject: String,
    pub session_type: String,
    pub date: String,
    pub time: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub tutor_id: Uuid,
    pub subject: String,
    pub session_type: String,
    pub date: String,
    pub time: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            student_id: booking.student_id,
            tutor_id: booking.tutor_id,
            subject: booking.subject,
            session_type: booking.session_type.to_string(),
            date: booking.date,
            time: booking.time,
            status: booking.status.to_string(),
            created_at: booking.created_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking created with status pending", body = BookingResponse),
        (status = 400, description = "Invalid field"),
        (status = 403, description = "Caller is not a student")
    ),
    security(("bearer" = [])),
    tag = "Bookings"
)]
pub async fn create_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    let student_id = require_role(&identity, UserRole::Student)?;
    let session_type: SessionType = parse_field("sessionType", &req.session_type)?;

    let booking = state
        .bookings
        .create_booking(
            student_id,
            NewBooking {
                tutor_id: req.tutor_id,
                subject: req.subject,
                session_type,
                date: req.date,
                time: req.time,
            },
        )
        .await?;
    Ok(Json(booking.into()))
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    responses(
        (status = 200, description = "The caller's bookings", body = [BookingResponse]),
        (status = 403, description = "Caller is not a student")
    ),
    security(("bearer" = [])),
    tag = "Bookings"
)]
pub async fn list_bookings_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let student_id = require_role(&identity, UserRole::Student)?;
    let bookings = state.bookings.list_bookings(student_id).await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "The booking", body = BookingResponse),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer" = [])),
    tag = "Bookings"
)]
pub async fn get_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiPath(booking_id): ApiPath<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    let student_id = require_role(&identity, UserRole::Student)?;
    let booking = state.bookings.get_booking(booking_id, student_id).await?;
    Ok(Json(booking.into()))
}

#[utoipa::path(
    put,
    path = "/api/bookings/{id}/cancel",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking cancelled", body = AckResponse),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer" = [])),
    tag = "Bookings"
)]
pub async fn cancel_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiPath(booking_id): ApiPath<Uuid>,
) -> Result<Json<AckResponse>, ApiError> {
    let student_id = require_role(&identity, UserRole::Student)?;
    state.bookings.cancel_booking(booking_id, student_id).await?;
    Ok(Json(AckResponse::new("Booking cancelled successfully")))
}

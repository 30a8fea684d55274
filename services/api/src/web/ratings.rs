//! services/api/src/web/ratings.rs
//!
//! Rating endpoints: a student rates a completed session, and anyone can read
//! a teacher's ratings and their aggregate.

use axum::{
    extract::State,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use pocket_tutor_core::domain::{Identity, NewRating, Rating, RatingStats, TeacherRating, UserRole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::extract::{ApiJson, ApiPath};
use crate::web::middleware::require_role;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatingRequest {
    pub teacher_id: Uuid,
    pub session_id: Uuid,
    /// 1 to 5.
    pub rating: i64,
    pub comment: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub teacher_id: Uuid,
    pub session_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        Self {
            id: rating.id,
            student_id: rating.student_id,
            teacher_id: rating.teacher_id,
            session_id: rating.session_id,
            rating: rating.score,
            comment: rating.comment,
            created_at: rating.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRatingResponse {
    pub id: Uuid,
    pub student_name: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TeacherRating> for TeacherRatingResponse {
    fn from(rating: TeacherRating) -> Self {
        Self {
            id: rating.id,
            student_name: rating.student_name,
            rating: rating.score,
            comment: rating.comment,
            created_at: rating.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingStatsResponse {
    pub average_rating: f64,
    pub total_ratings: u64,
    /// Score ("1" to "5") to count.
    #[schema(value_type = Object)]
    pub rating_distribution: BTreeMap<u8, u64>,
}

impl From<RatingStats> for RatingStatsResponse {
    fn from(stats: RatingStats) -> Self {
        Self {
            average_rating: stats.average_rating,
            total_ratings: stats.total_ratings,
            rating_distribution: stats.distribution,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Rate a completed session. At most one rating per student and session.
#[utoipa::path(
    post,
    path = "/api/ratings",
    request_body = CreateRatingRequest,
    responses(
        (status = 200, description = "Rating stored; the teacher is notified", body = RatingResponse),
        (status = 400, description = "Score outside 1-5 or comment too long"),
        (status = 404, description = "Session not found or not completed"),
        (status = 409, description = "Rating already exists for this session")
    ),
    security(("bearer" = [])),
    tag = "Ratings"
)]
pub async fn create_rating_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<CreateRatingRequest>,
) -> Result<Json<RatingResponse>, ApiError> {
    let student_id = require_role(&identity, UserRole::Student)?;
    let rating = state
        .ratings
        .create_rating(
            student_id,
            NewRating {
                teacher_id: req.teacher_id,
                session_id: req.session_id,
                score: req.rating,
                comment: req.comment,
            },
        )
        .await?;
    Ok(Json(rating.into()))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}/ratings",
    params(("id" = Uuid, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Newest ratings first", body = [TeacherRatingResponse])
    ),
    tag = "Ratings"
)]
pub async fn teacher_ratings_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(teacher_id): ApiPath<Uuid>,
) -> Result<Json<Vec<TeacherRatingResponse>>, ApiError> {
    let ratings = state.ratings.teacher_ratings(teacher_id).await?;
    Ok(Json(ratings.into_iter().map(TeacherRatingResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}/rating-stats",
    params(("id" = Uuid, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Average, total and distribution", body = RatingStatsResponse)
    ),
    tag = "Ratings"
)]
pub async fn teacher_rating_stats_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(teacher_id): ApiPath<Uuid>,
) -> Result<Json<RatingStatsResponse>, ApiError> {
    let stats = state.ratings.teacher_rating_stats(teacher_id).await?;
    Ok(Json(stats.into()))
}

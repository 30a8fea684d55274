//! services/api/src/web/teachers.rs
//!
//! Teacher dashboard statistics and the public teacher search.

use axum::{
    extract::State,
    Extension, Json,
};
use pocket_tutor_core::domain::{
    DashboardStats, Identity, TeacherSearch, TeacherSummary, UserRole,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::web::auth::UserResponse;
use crate::web::extract::ApiQuery;
use crate::web::middleware::require_role;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TeacherSearchParams {
    /// Case-insensitive substring of the university name.
    pub university: Option<String>,
    pub min_rating: Option<f64>,
    /// Defaults to 20.
    pub limit: Option<usize>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsResponse {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub pending_sessions: u64,
    pub unique_students: u64,
    pub average_rating: f64,
    pub total_earnings: f64,
    pub total_ratings: u64,
}

impl From<DashboardStats> for DashboardStatsResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_sessions: stats.total_sessions,
            completed_sessions: stats.completed_sessions,
            pending_sessions: stats.pending_sessions,
            unique_students: stats.unique_students,
            average_rating: stats.average_rating,
            total_earnings: stats.total_earnings,
            total_ratings: stats.total_ratings,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSearchResult {
    #[serde(flatten)]
    pub teacher: UserResponse,
    pub average_rating: f64,
    pub total_ratings: u64,
    pub completed_sessions: u64,
}

impl From<TeacherSummary> for TeacherSearchResult {
    fn from(summary: TeacherSummary) -> Self {
        Self {
            teacher: summary.teacher.into(),
            average_rating: summary.average_rating,
            total_ratings: summary.total_ratings,
            completed_sessions: summary.completed_sessions,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

#[utoipa::path(
    get,
    path = "/api/teachers/dashboard-stats",
    responses(
        (status = 200, description = "Aggregates over the caller's sessions and ratings", body = DashboardStatsResponse),
        (status = 403, description = "Caller is not a teacher")
    ),
    security(("bearer" = [])),
    tag = "Teachers"
)]
pub async fn dashboard_stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<DashboardStatsResponse>, ApiError> {
    let teacher_id = require_role(&identity, UserRole::Teacher)?;
    let stats = state.teachers.dashboard_stats(teacher_id).await?;
    Ok(Json(stats.into()))
}

#[utoipa::path(
    get,
    path = "/api/teachers/search",
    params(TeacherSearchParams),
    responses(
        (status = 200, description = "Matching teachers with their rating summary", body = [TeacherSearchResult])
    ),
    tag = "Teachers"
)]
pub async fn search_teachers_handler(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<TeacherSearchParams>,
) -> Result<Json<Vec<TeacherSearchResult>>, ApiError> {
    let teachers = state
        .teachers
        .search(TeacherSearch {
            university: params.university.filter(|u| !u.trim().is_empty()),
            min_rating: params.min_rating,
            limit: params.limit,
        })
        .await?;
    Ok(Json(teachers.into_iter().map(TeacherSearchResult::from).collect()))
}

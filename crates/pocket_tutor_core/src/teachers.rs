//! Teacher dashboard statistics and the public teacher search.

use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{DashboardStats, SessionStatus, TeacherSearch, TeacherSummary};
use crate::ports::{DatabaseService, PortResult, SessionFilter};
use crate::ratings::{average_score, mean_score, round_two_decimals, STATS_SCAN_LIMIT};

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
const SESSION_SCAN_LIMIT: usize = 1000;

#[derive(Clone)]
pub struct TeacherService {
    db: Arc<dyn DatabaseService>,
}

impl TeacherService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn dashboard_stats(&self, teacher_id: Uuid) -> PortResult<DashboardStats> {
        let all = SessionFilter::for_teacher(teacher_id);
        let completed = all.clone().with_status(SessionStatus::Completed);
        let pending = all.clone().with_status(SessionStatus::Pending);

        let total_sessions = self.db.count_sessions(&all).await?;
        let completed_sessions = self.db.count_sessions(&completed).await?;
        let pending_sessions = self.db.count_sessions(&pending).await?;

        let sessions = self.db.find_sessions(&all, SESSION_SCAN_LIMIT).await?;
        let unique_students = sessions
            .iter()
            .map(|s| s.student_id)
            .collect::<HashSet<_>>()
            .len() as u64;
        let total_earnings: f64 = sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Completed)
            .map(|s| s.price)
            .sum();

        let ratings = self.db.find_ratings_for_teacher(teacher_id, STATS_SCAN_LIMIT).await?;
        let scores: Vec<u8> = ratings.iter().map(|r| r.score).collect();

        Ok(DashboardStats {
            total_sessions,
            completed_sessions,
            pending_sessions,
            unique_students,
            average_rating: average_score(&scores),
            total_earnings,
            total_ratings: scores.len() as u64,
        })
    }

    /// Store order is kept; no ranking is applied.
    pub async fn search(&self, query: TeacherSearch) -> PortResult<Vec<TeacherSummary>> {
        let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let teachers = self.db.search_teachers(query.university.as_deref(), limit).await?;

        let mut result = Vec::with_capacity(teachers.len());
        for teacher in teachers {
            let ratings = self.db.find_ratings_for_teacher(teacher.id, STATS_SCAN_LIMIT).await?;
            let scores: Vec<u8> = ratings.iter().map(|r| r.score).collect();
            let mean = mean_score(&scores);

            // The cut uses the unrounded mean.
            if query.min_rating.is_some_and(|min| mean < min) {
                continue;
            }

            let completed_sessions = self
                .db
                .count_sessions(
                    &SessionFilter::for_teacher(teacher.id).with_status(SessionStatus::Completed),
                )
                .await?;
            result.push(TeacherSummary {
                teacher,
                average_rating: round_two_decimals(mean),
                total_ratings: scores.len() as u64,
                completed_sessions,
            });
        }
        Ok(result)
    }
}

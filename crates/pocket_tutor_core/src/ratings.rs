//! crates/pocket_tutor_core/src/ratings.rs
//!
//! Ratings: one per (student, completed session), plus the public listing
//! and aggregate statistics shown on a teacher's page.

use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    NewRating, NotificationKind, Rating, RatingStats, SessionStatus, TeacherRating, UserRole,
};
use crate::localization::{RATING_MESSAGE, RATING_TITLE, UNKNOWN_STUDENT_NAME};
use crate::notifications::{NotificationDispatcher, NotificationDraft};
use crate::ports::{DatabaseService, PortError, PortResult, SessionFilter};
use crate::validation::{check_max_length, check_range};

const PUBLIC_RATINGS_LIMIT: usize = 100;
pub(crate) const STATS_SCAN_LIMIT: usize = 1000;

/// Unrounded arithmetic mean; 0 for an empty slice.
pub(crate) fn mean_score(scores: &[u8]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let sum: u64 = scores.iter().map(|&s| u64::from(s)).sum();
    sum as f64 / scores.len() as f64
}

pub(crate) fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean rounded to two decimals, for display.
pub(crate) fn average_score(scores: &[u8]) -> f64 {
    round_two_decimals(mean_score(scores))
}

/// Summarizes a set of scores; the distribution always has keys 1..=5.
pub fn rating_stats(scores: &[u8]) -> RatingStats {
    let mut distribution: BTreeMap<u8, u64> = (1..=5).map(|score| (score, 0)).collect();
    for score in scores {
        *distribution.entry(*score).or_insert(0) += 1;
    }
    RatingStats {
        average_rating: average_score(scores),
        total_ratings: scores.len() as u64,
        distribution,
    }
}

#[derive(Clone)]
pub struct RatingService {
    db: Arc<dyn DatabaseService>,
    notifications: NotificationDispatcher,
}

impl RatingService {
    pub fn new(db: Arc<dyn DatabaseService>, notifications: NotificationDispatcher) -> Self {
        Self { db, notifications }
    }

    /// Rates a completed session of `student_id`.
    ///
    /// The session lookup filters on id, student, teacher and completed status
    /// at once, so a missing, foreign or unfinished session are all `NotFound`.
    /// Duplicate ratings are rejected by the store's uniqueness constraint.
    pub async fn create_rating(&self, student_id: Uuid, input: NewRating) -> PortResult<Rating> {
        check_range("rating", input.score, 1, 5)?;
        check_max_length("comment", input.comment.as_deref(), 500)?;
        let score = u8::try_from(input.score)
            .map_err(|_| PortError::Validation("rating must be between 1 and 5".to_string()))?;

        let filter = SessionFilter {
            id: Some(input.session_id),
            student_id: Some(student_id),
            teacher_id: Some(input.teacher_id),
            status: Some(SessionStatus::Completed),
        };
        if self.db.find_session(&filter).await?.is_none() {
            return Err(PortError::NotFound("Session not found or not completed".to_string()));
        }

        let rating = Rating {
            id: Uuid::new_v4(),
            student_id,
            teacher_id: input.teacher_id,
            session_id: input.session_id,
            score,
            comment: input.comment,
            created_at: Utc::now(),
        };
        self.db.insert_rating(rating.clone()).await?;
        info!(
            rating_id = %rating.id,
            session_id = %rating.session_id,
            teacher_id = %rating.teacher_id,
            score,
            "Rating recorded"
        );

        let student_name = self
            .db
            .find_user(UserRole::Student, student_id)
            .await?
            .map(|s| s.name)
            .unwrap_or_else(|| UNKNOWN_STUDENT_NAME.to_string());
        let score_text = score.to_string();

        self.notifications
            .notify(NotificationDraft {
                user_id: rating.teacher_id,
                user_role: UserRole::Teacher,
                kind: NotificationKind::RatingReceived,
                title: RATING_TITLE.render(&[]),
                message: RATING_MESSAGE.render(&[("score", &score_text), ("name", &student_name)]),
                data: Some(json!({ "ratingId": rating.id, "sessionId": rating.session_id })),
            })
            .await?;

        Ok(rating)
    }

    /// Up to 100 ratings, each with the rating student's display name.
    pub async fn teacher_ratings(&self, teacher_id: Uuid) -> PortResult<Vec<TeacherRating>> {
        let ratings = self.db.find_ratings_for_teacher(teacher_id, PUBLIC_RATINGS_LIMIT).await?;

        let mut result = Vec::with_capacity(ratings.len());
        for rating in ratings {
            let student_name = self
                .db
                .find_user(UserRole::Student, rating.student_id)
                .await?
                .map(|s| s.name)
                .unwrap_or_else(|| UNKNOWN_STUDENT_NAME.to_string());
            result.push(TeacherRating {
                id: rating.id,
                student_name,
                score: rating.score,
                comment: rating.comment,
                created_at: rating.created_at,
            });
        }
        Ok(result)
    }

    pub async fn teacher_rating_stats(&self, teacher_id: Uuid) -> PortResult<RatingStats> {
        let ratings = self.db.find_ratings_for_teacher(teacher_id, STATS_SCAN_LIMIT).await?;
        let scores: Vec<u8> = ratings.iter().map(|r| r.score).collect();
        Ok(rating_stats(&scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identity, NewSession, Session};
    use crate::localization::ENGLISH;
    use crate::memory::InMemoryDatabase;
    use crate::notifications::test_support::RecordingPush;
    use crate::sessions::test_support::{math_session, seed_student, seed_teacher};
    use crate::sessions::SessionService;

    struct Fixture {
        db: Arc<InMemoryDatabase>,
        sessions: SessionService,
        ratings: RatingService,
        notifications: NotificationDispatcher,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(InMemoryDatabase::new());
        let notifications =
            NotificationDispatcher::new(db.clone(), Arc::new(RecordingPush::default()));
        Fixture {
            sessions: SessionService::new(db.clone(), notifications.clone()),
            ratings: RatingService::new(db.clone(), notifications.clone()),
            notifications,
            db,
        }
    }

    fn five_stars(session: &Session) -> NewRating {
        NewRating {
            teacher_id: session.teacher_id,
            session_id: session.id,
            score: 5,
            comment: Some("Clear explanations".to_string()),
        }
    }

    async fn book(f: &Fixture, student_id: Uuid, input: NewSession) -> Session {
        f.sessions.create_session(student_id, input).await.unwrap()
    }

    #[test]
    fn stats_of_no_ratings_are_zero_filled() {
        let stats = rating_stats(&[]);
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.total_ratings, 0);
        assert_eq!(stats.distribution.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert!(stats.distribution.values().all(|&count| count == 0));
    }

    #[test]
    fn stats_round_the_mean_to_two_decimals() {
        let stats = rating_stats(&[5, 5, 4]);
        assert_eq!(stats.average_rating, 4.67);
        assert_eq!(stats.total_ratings, 3);
        assert_eq!(stats.distribution[&4], 1);
        assert_eq!(stats.distribution[&5], 2);
        assert_eq!(stats.distribution[&1], 0);
    }

    #[tokio::test]
    async fn full_booking_to_rating_scenario() {
        let f = fixture();
        let student = seed_student(f.db.as_ref(), "Sara").await;
        let teacher = seed_teacher(f.db.as_ref(), "Omar").await;
        let session = book(&f, student.id, math_session(teacher.id)).await;
        assert_eq!(session.status, SessionStatus::Pending);

        f.sessions
            .update_status(session.id, SessionStatus::Completed, Identity::student(student.id))
            .await
            .unwrap();
        let rating = f.ratings.create_rating(student.id, five_stars(&session)).await.unwrap();
        assert_eq!(rating.score, 5);

        let inbox = f.notifications.list(teacher.id, None).await.unwrap();
        let kinds: Vec<NotificationKind> = inbox.iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::RatingReceived, NotificationKind::BookingConfirmed]);
        assert_eq!(inbox[0].message[ENGLISH], "You received 5 stars rating from Sara");
        assert_eq!(
            inbox[0].data,
            Some(json!({ "ratingId": rating.id, "sessionId": session.id }))
        );

        let again = f.ratings.create_rating(student.id, five_stars(&session)).await.unwrap_err();
        assert!(matches!(again, PortError::Conflict(_)));
    }

    #[tokio::test]
    async fn rating_requires_a_completed_session() {
        let f = fixture();
        let student = seed_student(f.db.as_ref(), "Sara").await;
        let teacher = seed_teacher(f.db.as_ref(), "Omar").await;
        let session = book(&f, student.id, math_session(teacher.id)).await;

        for status in [SessionStatus::Pending, SessionStatus::Confirmed, SessionStatus::Cancelled] {
            f.sessions
                .update_status(session.id, status, Identity::teacher(teacher.id))
                .await
                .unwrap();
            let err = f.ratings.create_rating(student.id, five_stars(&session)).await.unwrap_err();
            assert!(matches!(err, PortError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn rating_someone_elses_session_is_not_found() {
        let f = fixture();
        let student = seed_student(f.db.as_ref(), "Sara").await;
        let teacher = seed_teacher(f.db.as_ref(), "Omar").await;
        let session = book(&f, student.id, math_session(teacher.id)).await;
        f.sessions
            .update_status(session.id, SessionStatus::Completed, Identity::teacher(teacher.id))
            .await
            .unwrap();

        let intruder = f.ratings.create_rating(Uuid::new_v4(), five_stars(&session)).await;
        let wrong_teacher = f
            .ratings
            .create_rating(
                student.id,
                NewRating { teacher_id: Uuid::new_v4(), ..five_stars(&session) },
            )
            .await;

        assert!(matches!(intruder, Err(PortError::NotFound(_))));
        assert!(matches!(wrong_teacher, Err(PortError::NotFound(_))));
    }

    #[tokio::test]
    async fn rating_fields_are_validated() {
        let f = fixture();
        let session_id = Uuid::new_v4();
        for score in [0, 6, -3] {
            let input = NewRating {
                teacher_id: Uuid::new_v4(),
                session_id,
                score,
                comment: None,
            };
            let err = f.ratings.create_rating(Uuid::new_v4(), input).await.unwrap_err();
            assert!(matches!(err, PortError::Validation(_)));
        }
        let long_comment = NewRating {
            teacher_id: Uuid::new_v4(),
            session_id,
            score: 3,
            comment: Some("x".repeat(501)),
        };
        let err = f.ratings.create_rating(Uuid::new_v4(), long_comment).await.unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
    }

    #[tokio::test]
    async fn teacher_ratings_fall_back_to_placeholder_name() {
        let f = fixture();
        let teacher = seed_teacher(f.db.as_ref(), "Omar").await;
        let orphan = Rating {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            teacher_id: teacher.id,
            session_id: Uuid::new_v4(),
            score: 3,
            comment: None,
            created_at: Utc::now(),
        };
        f.db.insert_rating(orphan).await.unwrap();

        let listed = f.ratings.teacher_ratings(teacher.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].student_name, UNKNOWN_STUDENT_NAME);
    }

    #[tokio::test]
    async fn teacher_stats_aggregate_stored_ratings() {
        let f = fixture();
        let teacher = seed_teacher(f.db.as_ref(), "Omar").await;
        for score in [5, 5, 4] {
            f.db.insert_rating(Rating {
                id: Uuid::new_v4(),
                student_id: Uuid::new_v4(),
                teacher_id: teacher.id,
                session_id: Uuid::new_v4(),
                score,
                comment: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        }

        let stats = f.ratings.teacher_rating_stats(teacher.id).await.unwrap();
        assert_eq!(stats, rating_stats(&[5, 5, 4]));
        let empty = f.ratings.teacher_rating_stats(Uuid::new_v4()).await.unwrap();
        assert_eq!(empty.total_ratings, 0);
    }
}

//! crates/pocket_tutor_core/src/sessions.rs
//!
//! Session and booking lifecycle: creation, listing and status transitions.
//!
//! Status updates accept any target status from either participant. The
//! intended transition graph is documented on `SessionStatus` but not
//! enforced here, and a status change emits no notification.

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    Booking, BookingStatus, Identity, NewBooking, NewSession, NotificationKind, Session,
    SessionStatus, UserRole,
};
use crate::localization::{BOOKING_MESSAGE, BOOKING_TITLE, UNKNOWN_STUDENT_NAME};
use crate::notifications::{NotificationDispatcher, NotificationDraft};
use crate::ports::{DatabaseService, PortError, PortResult, SessionFilter};
use crate::validation::{check_length, check_max_length, check_non_negative, check_range};

pub const DEFAULT_DURATION_MINUTES: i32 = 60;
pub const DEFAULT_MAX_STUDENTS: i32 = 1;
const MY_SESSIONS_LIMIT: usize = 100;
const MY_BOOKINGS_LIMIT: usize = 1000;

fn validate_new_session(input: &NewSession) -> PortResult<()> {
    check_length("subject", &input.subject, 2, 100)?;
    if let Some(duration) = input.duration_minutes {
        check_range("duration", duration.into(), 30, 180)?;
    }
    if let Some(max_students) = input.max_students {
        check_range("max_students", max_students.into(), 1, 10)?;
    }
    check_non_negative("price", input.price)?;
    check_max_length("notes", input.notes.as_deref(), 1000)
}

#[derive(Clone)]
pub struct SessionService {
    db: Arc<dyn DatabaseService>,
    notifications: NotificationDispatcher,
}

impl SessionService {
    pub fn new(db: Arc<dyn DatabaseService>, notifications: NotificationDispatcher) -> Self {
        Self { db, notifications }
    }

    /// Books a pending session for `student_id` and tells the teacher about it.
    pub async fn create_session(&self, student_id: Uuid, input: NewSession) -> PortResult<Session> {
        validate_new_session(&input)?;

        if self.db.find_user(UserRole::Teacher, input.teacher_id).await?.is_none() {
            return Err(PortError::NotFound("Teacher not found".to_string()));
        }

        let session = Session {
            id: Uuid::new_v4(),
            teacher_id: input.teacher_id,
            student_id,
            subject: input.subject,
            session_type: input.session_type,
            date: input.date,
            time: input.time,
            duration_minutes: input.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
            max_students: input.max_students.unwrap_or(DEFAULT_MAX_STUDENTS),
            price: input.price,
            notes: input.notes,
            status: SessionStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.db.insert_session(session.clone()).await?;
        info!(
            session_id = %session.id,
            student_id = %student_id,
            teacher_id = %session.teacher_id,
            "Session booked"
        );

        let student_name = self
            .db
            .find_user(UserRole::Student, student_id)
            .await?
            .map(|s| s.name)
            .unwrap_or_else(|| UNKNOWN_STUDENT_NAME.to_string());

        self.notifications
            .notify(NotificationDraft {
                user_id: session.teacher_id,
                user_role: UserRole::Teacher,
                kind: NotificationKind::BookingConfirmed,
                title: BOOKING_TITLE.render(&[]),
                message: BOOKING_MESSAGE.render(&[("name", &student_name)]),
                data: Some(json!({ "sessionId": session.id })),
            })
            .await?;

        Ok(session)
    }

    /// Sessions where the caller is the student or the teacher, depending on role.
    pub async fn list_my_sessions(&self, caller: Identity) -> PortResult<Vec<Session>> {
        let filter = match caller.role {
            UserRole::Student => SessionFilter::for_student(caller.user_id),
            UserRole::Teacher => SessionFilter::for_teacher(caller.user_id),
        };
        self.db.find_sessions(&filter, MY_SESSIONS_LIMIT).await
    }

    pub async fn update_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        caller: Identity,
    ) -> PortResult<()> {
        let session = self
            .db
            .find_session(&SessionFilter::by_id(session_id))
            .await?
            .ok_or_else(|| PortError::NotFound("Session not found".to_string()))?;

        let owner = match caller.role {
            UserRole::Student => session.student_id,
            UserRole::Teacher => session.teacher_id,
        };
        if owner != caller.user_id {
            return Err(PortError::Forbidden("Not authorized".to_string()));
        }

        self.db.update_session_status(session_id, status, Utc::now()).await?;
        info!(
            session_id = %session_id,
            from = %session.status,
            to = %status,
            by = %caller.user_id,
            "Session status updated"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct BookingService {
    db: Arc<dyn DatabaseService>,
}

impl BookingService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn create_booking(&self, student_id: Uuid, input: NewBooking) -> PortResult<Booking> {
        let booking = Booking {
            id: Uuid::new_v4(),
            student_id,
            tutor_id: input.tutor_id,
            subject: input.subject,
            session_type: input.session_type,
            date: input.date,
            time: input.time,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };
        self.db.insert_booking(booking.clone()).await?;
        info!(booking_id = %booking.id, student_id = %student_id, "Booking created");
        Ok(booking)
    }

    pub async fn list_bookings(&self, student_id: Uuid) -> PortResult<Vec<Booking>> {
        self.db.find_bookings_for_student(student_id, MY_BOOKINGS_LIMIT).await
    }

    /// One lookup filtered on id and owner; a foreign booking reads as missing.
    pub async fn get_booking(&self, booking_id: Uuid, student_id: Uuid) -> PortResult<Booking> {
        self.db
            .find_booking(booking_id, student_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Booking not found".to_string()))
    }

    /// Same information hiding as `get_booking`.
    pub async fn cancel_booking(&self, booking_id: Uuid, student_id: Uuid) -> PortResult<()> {
        let matched = self
            .db
            .update_booking_status(booking_id, student_id, BookingStatus::Cancelled)
            .await?;
        if matched == 0 {
            return Err(PortError::NotFound("Booking not found".to_string()));
        }
        info!(booking_id = %booking_id, "Booking cancelled");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::{NewUser, RoleDetails, SessionType, User};
    use serde_json::Map;

    pub async fn seed_user(db: &dyn DatabaseService, name: &str, details: RoleDetails) -> User {
        let id = Uuid::new_v4();
        db.create_user(NewUser {
            id,
            name: name.to_string(),
            phone: "0500000000".to_string(),
            email: format!("{}@example.com", id),
            university_name: "King Saud University".to_string(),
            details,
            hashed_password: "hash".to_string(),
            preferences: Map::new(),
            created_at: Utc::now(),
        })
        .await
        .unwrap()
    }

    pub async fn seed_student(db: &dyn DatabaseService, name: &str) -> User {
        let number = Uuid::new_v4().simple().to_string();
        seed_user(db, name, RoleDetails::Student { student_number: number }).await
    }

    pub async fn seed_teacher(db: &dyn DatabaseService, name: &str) -> User {
        seed_user(db, name, RoleDetails::Teacher { years_experience: 4, gpa: 3.8 }).await
    }

    pub fn math_session(teacher_id: Uuid) -> NewSession {
        NewSession {
            teacher_id,
            subject: "Math".to_string(),
            session_type: SessionType::Individual,
            date: "2024-05-01".to_string(),
            time: "14:30".to_string(),
            duration_minutes: None,
            max_students: None,
            price: 50.0,
            notes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::domain::SessionType;
    use crate::localization::ENGLISH;
    use crate::memory::InMemoryDatabase;
    use crate::notifications::test_support::RecordingPush;

    struct Fixture {
        db: Arc<InMemoryDatabase>,
        sessions: SessionService,
        bookings: BookingService,
        notifications: NotificationDispatcher,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(InMemoryDatabase::new());
        let notifications =
            NotificationDispatcher::new(db.clone(), Arc::new(RecordingPush::default()));
        Fixture {
            sessions: SessionService::new(db.clone(), notifications.clone()),
            bookings: BookingService::new(db.clone()),
            notifications,
            db,
        }
    }

    #[tokio::test]
    async fn create_session_is_pending_and_notifies_teacher() {
        let f = fixture();
        let student = seed_student(f.db.as_ref(), "Sara").await;
        let teacher = seed_teacher(f.db.as_ref(), "Omar").await;

        let session =
            f.sessions.create_session(student.id, math_session(teacher.id)).await.unwrap();

        assert_eq!(session.status, SessionStatus::Pending);
        assert_eq!(session.student_id, student.id);
        assert_eq!(session.duration_minutes, DEFAULT_DURATION_MINUTES);
        assert_eq!(session.max_students, DEFAULT_MAX_STUDENTS);

        let inbox = f.notifications.list(teacher.id, None).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationKind::BookingConfirmed);
        assert_eq!(inbox[0].user_role, UserRole::Teacher);
        assert_eq!(inbox[0].message[ENGLISH], "New student Sara booked a session with you");
        assert_eq!(inbox[0].data, Some(json!({ "sessionId": session.id })));
    }

    #[tokio::test]
    async fn create_session_for_unknown_teacher_is_not_found() {
        let f = fixture();
        let student = seed_student(f.db.as_ref(), "Sara").await;

        let err = f
            .sessions
            .create_session(student.id, math_session(Uuid::new_v4()))
            .await
            .unwrap_err();

        assert_eq!(err, PortError::NotFound("Teacher not found".to_string()));
    }

    #[tokio::test]
    async fn create_session_rejects_out_of_range_fields() {
        let f = fixture();
        let teacher = seed_teacher(f.db.as_ref(), "Omar").await;
        let student = Uuid::new_v4();

        let cases: Vec<Box<dyn Fn(&mut NewSession)>> = vec![
            Box::new(|s: &mut NewSession| s.subject = "M".to_string()),
            Box::new(|s: &mut NewSession| s.duration_minutes = Some(20)),
            Box::new(|s: &mut NewSession| s.duration_minutes = Some(181)),
            Box::new(|s: &mut NewSession| s.max_students = Some(11)),
            Box::new(|s: &mut NewSession| s.max_students = Some(0)),
            Box::new(|s: &mut NewSession| s.price = -1.0),
            Box::new(|s: &mut NewSession| s.notes = Some("x".repeat(1001))),
        ];
        for mutate in cases {
            let mut input = math_session(teacher.id);
            mutate(&mut input);
            let err = f.sessions.create_session(student, input).await.unwrap_err();
            assert!(matches!(err, PortError::Validation(_)), "got {:?}", err);
        }
        assert!(f.notifications.list(teacher.id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_my_sessions_depends_on_role() {
        let f = fixture();
        let student = seed_student(f.db.as_ref(), "Sara").await;
        let other_student = seed_student(f.db.as_ref(), "Huda").await;
        let teacher = seed_teacher(f.db.as_ref(), "Omar").await;
        f.sessions.create_session(student.id, math_session(teacher.id)).await.unwrap();
        f.sessions.create_session(other_student.id, math_session(teacher.id)).await.unwrap();

        let mine = f.sessions.list_my_sessions(Identity::student(student.id)).await.unwrap();
        let taught = f.sessions.list_my_sessions(Identity::teacher(teacher.id)).await.unwrap();

        assert_eq!(mine.len(), 1);
        assert_eq!(taught.len(), 2);
    }

    #[tokio::test]
    async fn participants_may_set_any_status() {
        let f = fixture();
        let student = seed_student(f.db.as_ref(), "Sara").await;
        let teacher = seed_teacher(f.db.as_ref(), "Omar").await;
        let session =
            f.sessions.create_session(student.id, math_session(teacher.id)).await.unwrap();

        f.sessions
            .update_status(session.id, SessionStatus::Completed, Identity::student(student.id))
            .await
            .unwrap();
        // Leaving a terminal status is allowed.
        f.sessions
            .update_status(session.id, SessionStatus::Pending, Identity::teacher(teacher.id))
            .await
            .unwrap();

        let stored = f.db.find_session(&SessionFilter::by_id(session.id)).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Pending);
        assert!(stored.updated_at.is_some());
        // Only the booking notification exists.
        assert_eq!(f.notifications.list(teacher.id, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn third_party_status_update_is_forbidden_for_every_status() {
        let f = fixture();
        let student = seed_student(f.db.as_ref(), "Sara").await;
        let teacher = seed_teacher(f.db.as_ref(), "Omar").await;
        let session =
            f.sessions.create_session(student.id, math_session(teacher.id)).await.unwrap();
        let outsiders = [Identity::student(Uuid::new_v4()), Identity::teacher(Uuid::new_v4())];

        for caller in outsiders {
            for status in SessionStatus::ALL {
                let err = f.sessions.update_status(session.id, *status, caller).await.unwrap_err();
                assert!(matches!(err, PortError::Forbidden(_)));
            }
        }
    }

    #[tokio::test]
    async fn student_cannot_act_as_teacher_of_own_session() {
        let f = fixture();
        let student = seed_student(f.db.as_ref(), "Sara").await;
        let teacher = seed_teacher(f.db.as_ref(), "Omar").await;
        let session =
            f.sessions.create_session(student.id, math_session(teacher.id)).await.unwrap();

        let err = f
            .sessions
            .update_status(session.id, SessionStatus::Confirmed, Identity::teacher(student.id))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Forbidden(_)));
    }

    #[tokio::test]
    async fn update_status_of_missing_session_is_not_found() {
        let f = fixture();
        let err = f
            .sessions
            .update_status(Uuid::new_v4(), SessionStatus::Confirmed, Identity::student(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn date_and_time_are_free_text() {
        let f = fixture();
        let student = seed_student(f.db.as_ref(), "Sara").await;
        let teacher = seed_teacher(f.db.as_ref(), "Omar").await;

        let cases = [("2024-05-01", "14:30:00"), ("2024-05-01", "2:30 PM"), ("Sunday", "14:30")];
        for (date, time) in cases {
            let mut input = math_session(teacher.id);
            input.date = date.to_string();
            input.time = time.to_string();
            let session = f.sessions.create_session(student.id, input).await.unwrap();
            assert_eq!((session.date.as_str(), session.time.as_str()), (date, time));

            let mut booking = booking_input();
            booking.date = date.to_string();
            booking.time = time.to_string();
            f.bookings.create_booking(student.id, booking).await.unwrap();
        }

        let mut long_subject = booking_input();
        long_subject.subject = "x".repeat(300);
        assert!(f.bookings.create_booking(student.id, long_subject).await.is_ok());
    }

    fn booking_input() -> NewBooking {
        NewBooking {
            tutor_id: Uuid::new_v4(),
            subject: "Physics".to_string(),
            session_type: SessionType::Group,
            date: "2024-06-10".to_string(),
            time: "09:00".to_string(),
        }
    }

    #[tokio::test]
    async fn cancel_booking_hides_foreign_bookings() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let booking = f.bookings.create_booking(owner, booking_input()).await.unwrap();

        let foreign = f.bookings.cancel_booking(booking.id, Uuid::new_v4()).await.unwrap_err();
        let missing = f.bookings.cancel_booking(Uuid::new_v4(), owner).await.unwrap_err();
        assert_eq!(foreign, missing);

        f.bookings.cancel_booking(booking.id, owner).await.unwrap();
        let stored = f.bookings.get_booking(booking.id, owner).await.unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn get_and_list_bookings_are_owner_scoped() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let booking = f.bookings.create_booking(owner, booking_input()).await.unwrap();
        f.bookings.create_booking(Uuid::new_v4(), booking_input()).await.unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(f.bookings.list_bookings(owner).await.unwrap().len(), 1);
        let err = f.bookings.get_booking(booking.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }
}

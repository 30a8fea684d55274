//! crates/pocket_tutor_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete document store, push provider or LLM vendor.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    AuthSession, Booking, BookingStatus, Identity, Message, Notification, NewUser, ProfileUpdate, Rating,
    Session, SessionStatus, User, UserCredentials, UserRole,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error type shared by every port and every domain service.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum PortError {
    /// The entity is absent, or present but not owned by the caller.
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// A store-enforced uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Filters
//=========================================================================================

/// Equality filter over the sessions collection. `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFilter {
    pub id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub status: Option<SessionStatus>,
}

impl SessionFilter {
    pub fn by_id(id: Uuid) -> Self {
        Self { id: Some(id), ..Self::default() }
    }

    pub fn for_student(student_id: Uuid) -> Self {
        Self { student_id: Some(student_id), ..Self::default() }
    }

    pub fn for_teacher(teacher_id: Uuid) -> Self {
        Self { teacher_id: Some(teacher_id), ..Self::default() }
    }

    pub fn with_status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, session: &Session) -> bool {
        self.id.map_or(true, |id| session.id == id)
            && self.student_id.map_or(true, |id| session.student_id == id)
            && self.teacher_id.map_or(true, |id| session.teacher_id == id)
            && self.status.map_or(true, |status| session.status == status)
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The document store. Writes that carry an ownership field in their filter
/// return the number of matched records so callers can turn "no match" into
/// a single `NotFound` without a separate ownership comparison.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    /// Fails with `Conflict` when the email (or student number) is taken.
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn find_user(&self, role: UserRole, user_id: Uuid) -> PortResult<Option<User>>;

    async fn get_credentials_by_email(
        &self,
        role: UserRole,
        email: &str,
    ) -> PortResult<UserCredentials>;

    async fn get_credentials_by_id(
        &self,
        role: UserRole,
        user_id: Uuid,
    ) -> PortResult<UserCredentials>;

    async fn update_user_profile(
        &self,
        role: UserRole,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> PortResult<User>;

    async fn update_password_hash(
        &self,
        role: UserRole,
        user_id: Uuid,
        hashed_password: &str,
    ) -> PortResult<()>;

    /// Teachers whose university contains `university` (case-insensitive).
    async fn search_teachers(&self, university: Option<&str>, limit: usize)
        -> PortResult<Vec<User>>;

    // --- Auth Methods ---
    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()>;

    async fn find_auth_session(&self, token: &str) -> PortResult<Option<AuthSession>>;

    async fn delete_auth_session(&self, token: &str) -> PortResult<()>;

    // --- Tutoring Sessions ---
    async fn insert_session(&self, session: Session) -> PortResult<()>;

    async fn find_session(&self, filter: &SessionFilter) -> PortResult<Option<Session>>;

    /// Newest first.
    async fn find_sessions(&self, filter: &SessionFilter, limit: usize)
        -> PortResult<Vec<Session>>;

    async fn count_sessions(&self, filter: &SessionFilter) -> PortResult<u64>;

    async fn update_session_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        updated_at: DateTime<Utc>,
    ) -> PortResult<u64>;

    // --- Bookings ---
    async fn insert_booking(&self, booking: Booking) -> PortResult<()>;

    async fn find_booking(&self, booking_id: Uuid, student_id: Uuid)
        -> PortResult<Option<Booking>>;

    async fn find_bookings_for_student(
        &self,
        student_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Booking>>;

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        student_id: Uuid,
        status: BookingStatus,
    ) -> PortResult<u64>;

    // --- Ratings ---
    /// Fails with `Conflict` when (student, session) already has a rating.
    async fn insert_rating(&self, rating: Rating) -> PortResult<()>;

    /// Newest first.
    async fn find_ratings_for_teacher(&self, teacher_id: Uuid, limit: usize)
        -> PortResult<Vec<Rating>>;

    // --- Notifications ---
    async fn insert_notification(&self, notification: Notification) -> PortResult<()>;

    /// Newest first.
    async fn find_notifications_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Notification>>;

    async fn mark_notification_read(&self, notification_id: Uuid, user_id: Uuid)
        -> PortResult<u64>;

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> PortResult<u64>;

    // --- Messages ---
    async fn insert_message(&self, message: Message) -> PortResult<()>;

    /// Every message sent or received by `user_id`, newest first.
    async fn find_messages_for_participant(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Message>>;

    /// Marks unread messages from `sender_id` to `receiver_id` as read.
    async fn mark_messages_read(&self, receiver_id: Uuid, sender_id: Uuid) -> PortResult<u64>;
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Turns a bearer credential into the caller's identity.
    async fn resolve(&self, token: &str) -> PortResult<Identity>;
}

#[async_trait]
pub trait PushNotifier: Send + Sync {
    /// Best-effort delivery of an already persisted notification.
    async fn push(&self, notification: &Notification) -> PortResult<()>;
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends one user message under the given system prompt and returns the reply text.
    async fn complete(&self, system_prompt: &str, user_message: &str) -> PortResult<String>;
}

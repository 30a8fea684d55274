//! crates/pocket_tutor_core/src/domain.rs
//!
//! Defines the pure, core data structures for the tutoring marketplace.
//! These structs are independent of any database or wire format; the enums
//! carry their canonical string form so adapters can persist them as text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Enumerations
//=========================================================================================

/// Generates `as_str`, `Display` and `FromStr` for a fieldless enum whose
/// canonical form is a fixed lowercase string.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "'{}' is not a valid {}",
                        other,
                        stringify!($name)
                    )),
                }
            }
        }
    };
}

/// The two account partitions of the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Teacher,
}

string_enum!(UserRole {
    Student => "student",
    Teacher => "teacher",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Individual,
    Group,
}

string_enum!(SessionType {
    Individual => "individual",
    Group => "group",
});

/// Lifecycle of a booked tutoring session.
///
/// Intended graph: pending -> {confirmed, cancelled}, confirmed -> {completed,
/// cancelled}; completed and cancelled are terminal. `is_terminal` exposes
/// that graph, but status updates are not validated against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

string_enum!(SessionStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

/// Status of the simplified booking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Completed,
    Cancelled,
}

string_enum!(BookingStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Rejected => "rejected",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BookingConfirmed,
    SessionReminder,
    NewMessage,
    RatingReceived,
}

string_enum!(NotificationKind {
    BookingConfirmed => "booking_confirmed",
    SessionReminder => "session_reminder",
    NewMessage => "new_message",
    RatingReceived => "rating_received",
});

//=========================================================================================
// Identity and Users
//=========================================================================================

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Identity {
    pub fn student(user_id: Uuid) -> Self {
        Self { user_id, role: UserRole::Student }
    }

    pub fn teacher(user_id: Uuid) -> Self {
        Self { user_id, role: UserRole::Teacher }
    }
}

/// Fields that only exist on one of the two partitions.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleDetails {
    Student { student_number: String },
    Teacher { years_experience: i32, gpa: f64 },
}

impl RoleDetails {
    pub fn role(&self) -> UserRole {
        match self {
            RoleDetails::Student { .. } => UserRole::Student,
            RoleDetails::Teacher { .. } => UserRole::Teacher,
        }
    }
}

/// Represents a marketplace user - used throughout the app.
/// Never carries the credential hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub university_name: String,
    pub details: RoleDetails,
    pub preferences: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> UserRole {
        self.details.role()
    }
}

// Only used internally for login and password changes - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub role: UserRole,
    pub email: String,
    pub hashed_password: String,
}

/// A user record ready to be inserted; the store assigns nothing but
/// enforces email (and student number) uniqueness.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub university_name: String,
    pub details: RoleDetails,
    pub hashed_password: String,
    pub preferences: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

/// The subset of profile fields a user may change about themselves.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub university_name: Option<String>,
    pub preferences: Option<Map<String, Value>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.university_name.is_none()
            && self.preferences.is_none()
    }
}

// Represents a bearer token issued at login
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Sessions and Bookings
//=========================================================================================

/// A booked tutoring engagement between one student and one teacher.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    pub subject: String,
    pub session_type: SessionType,
    /// Free text, usually `YYYY-MM-DD`.
    pub date: String,
    /// Free text, usually `HH:MM`.
    pub time: String,
    pub duration_minutes: i32,
    pub max_students: i32,
    pub price: f64,
    pub notes: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Client input for booking a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub teacher_id: Uuid,
    pub subject: String,
    pub session_type: SessionType,
    pub date: String,
    pub time: String,
    pub duration_minutes: Option<i32>,
    pub max_students: Option<i32>,
    pub price: f64,
    pub notes: Option<String>,
}

/// A lightweight booking request, separate from the session flow.
#[derive(Debug, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub student_id: Uuid,
    pub tutor_id: Uuid,
    pub subject: String,
    pub session_type: SessionType,
    pub date: String,
    pub time: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub tutor_id: Uuid,
    pub subject: String,
    pub session_type: SessionType,
    pub date: String,
    pub time: String,
}

//=========================================================================================
// Ratings
//=========================================================================================

/// A 1-5 score left by a student for a completed session.
#[derive(Debug, Clone)]
pub struct Rating {
    pub id: Uuid,
    pub student_id: Uuid,
    pub teacher_id: Uuid,
    pub session_id: Uuid,
    pub score: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRating {
    pub teacher_id: Uuid,
    pub session_id: Uuid,
    pub score: i64,
    pub comment: Option<String>,
}

/// A rating as shown on a teacher's public page.
#[derive(Debug, Clone)]
pub struct TeacherRating {
    pub id: Uuid,
    pub student_name: String,
    pub score: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingStats {
    pub average_rating: f64,
    pub total_ratings: u64,
    /// Always holds the five keys 1..=5.
    pub distribution: BTreeMap<u8, u64>,
}

//=========================================================================================
// Notifications and Messages
//=========================================================================================

/// Language code -> localized string.
pub type LocalizedText = BTreeMap<String, String>;

/// A persisted, per-user, multilingual alert.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_role: UserRole,
    pub kind: NotificationKind,
    pub title: LocalizedText,
    pub message: LocalizedText,
    pub data: Option<Value>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A direct message between two users. Immutable except for `is_read`.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_role: UserRole,
    pub receiver_id: Uuid,
    pub receiver_role: UserRole,
    pub body: String,
    pub message_type: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub receiver_id: Uuid,
    pub receiver_role: UserRole,
    pub body: String,
    pub message_type: Option<String>,
}

/// Messages exchanged with one counterpart, newest first.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub counterpart_id: Uuid,
    pub messages: Vec<Message>,
    pub last_message: Message,
    pub unread_count: u64,
}

//=========================================================================================
// Teacher Dashboard
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub pending_sessions: u64,
    pub unique_students: u64,
    pub average_rating: f64,
    pub total_earnings: f64,
    pub total_ratings: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TeacherSearch {
    pub university: Option<String>,
    pub min_rating: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct TeacherSummary {
    pub teacher: User,
    pub average_rating: f64,
    pub total_ratings: u64,
    pub completed_sessions: u64,
}

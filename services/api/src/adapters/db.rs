//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Queries are checked at runtime rather than compile time so the crate builds
//! without a live database. Enumerations are stored as their canonical text and
//! localized text as JSONB.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pocket_tutor_core::domain::{
    AuthSession, Booking, BookingStatus, Identity, LocalizedText, Message, NewUser,
    Notification, ProfileUpdate, Rating, RoleDetails, Session, SessionStatus, User,
    UserCredentials, UserRole,
};
use pocket_tutor_core::ports::{DatabaseService, PortError, PortResult, SessionFilter};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// Error and Column Helpers
//=========================================================================================

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Turns a unique-index violation into `Conflict`, naming the offending field.
fn conflict_or_unexpected(e: sqlx::Error) -> PortError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let message = match db_err.constraint() {
                Some("students_email_key") => "student with this email already exists",
                Some("teachers_email_key") => "teacher with this email already exists",
                Some("students_student_number_key") => "Student ID already exists",
                Some("ratings_student_session_key") => "Rating already exists for this session",
                _ => "Record already exists",
            };
            return PortError::Conflict(message.to_string());
        }
    }
    unexpected(e)
}

fn parse_enum<T: FromStr<Err = String>>(value: &str) -> PortResult<T> {
    value.parse::<T>().map_err(PortError::Unexpected)
}

fn users_table(role: UserRole) -> &'static str {
    match role {
        UserRole::Student => "students",
        UserRole::Teacher => "teachers",
    }
}

/// Both partitions are read through one record shape; the columns of the
/// other partition come back as NULL.
fn user_columns(role: UserRole) -> &'static str {
    match role {
        UserRole::Student => {
            "id, name, phone, email, university_name, student_number, \
             NULL::INT4 AS years_experience, NULL::FLOAT8 AS gpa, \
             preferences, hashed_password, created_at"
        }
        UserRole::Teacher => {
            "id, name, phone, email, university_name, NULL::TEXT AS student_number, \
             years_experience, gpa, preferences, hashed_password, created_at"
        }
    }
}

const SESSION_COLUMNS: &str = "id, teacher_id, student_id, subject, session_type, session_date, \
     session_time, duration_minutes, max_students, price, notes, status, created_at, updated_at";

/// Optional equality filter: a NULL parameter matches every row.
const SESSION_FILTER: &str = "($1::UUID IS NULL OR id = $1) \
     AND ($2::UUID IS NULL OR student_id = $2) \
     AND ($3::UUID IS NULL OR teacher_id = $3) \
     AND ($4::TEXT IS NULL OR status = $4)";

const BOOKING_COLUMNS: &str =
    "id, student_id, tutor_id, subject, session_type, session_date, session_time, status, created_at";

const RATING_COLUMNS: &str = "id, student_id, teacher_id, session_id, score, comment, created_at";

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, user_role, kind, title, message, data, is_read, created_at";

const MESSAGE_COLUMNS: &str = "id, sender_id, sender_role, receiver_id, receiver_role, body, \
     message_type, is_read, created_at";

/// Escapes LIKE wildcards so user input is matched literally.
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    phone: String,
    email: String,
    university_name: String,
    student_number: Option<String>,
    years_experience: Option<i32>,
    gpa: Option<f64>,
    preferences: Json<Map<String, Value>>,
    hashed_password: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn details(&self, role: UserRole) -> PortResult<RoleDetails> {
        match role {
            UserRole::Student => Ok(RoleDetails::Student {
                student_number: self.student_number.clone().unwrap_or_default(),
            }),
            UserRole::Teacher => match (self.years_experience, self.gpa) {
                (Some(years_experience), Some(gpa)) => {
                    Ok(RoleDetails::Teacher { years_experience, gpa })
                }
                _ => Err(PortError::Unexpected(format!(
                    "teacher {} is missing experience or gpa",
                    self.id
                ))),
            },
        }
    }

    fn to_domain(self, role: UserRole) -> PortResult<User> {
        let details = self.details(role)?;
        Ok(User {
            id: self.id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            university_name: self.university_name,
            details,
            preferences: self.preferences.0,
            created_at: self.created_at,
        })
    }

    fn to_credentials(self, role: UserRole) -> UserCredentials {
        UserCredentials {
            user_id: self.id,
            role,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    token: String,
    user_id: Uuid,
    role: String,
    expires_at: DateTime<Utc>,
}
impl AuthSessionRecord {
    fn to_domain(self) -> PortResult<AuthSession> {
        Ok(AuthSession {
            token: self.token,
            identity: Identity { user_id: self.user_id, role: parse_enum(&self.role)? },
            expires_at: self.expires_at,
        })
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    teacher_id: Uuid,
    student_id: Uuid,
    subject: String,
    session_type: String,
    session_date: String,
    session_time: String,
    duration_minutes: i32,
    max_students: i32,
    price: f64,
    notes: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}
impl SessionRecord {
    fn to_domain(self) -> PortResult<Session> {
        Ok(Session {
            id: self.id,
            teacher_id: self.teacher_id,
            student_id: self.student_id,
            subject: self.subject,
            session_type: parse_enum(&self.session_type)?,
            date: self.session_date,
            time: self.session_time,
            duration_minutes: self.duration_minutes,
            max_students: self.max_students,
            price: self.price,
            notes: self.notes,
            status: parse_enum(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct BookingRecord {
    id: Uuid,
    student_id: Uuid,
    tutor_id: Uuid,
    subject: String,
    session_type: String,
    session_date: String,
    session_time: String,
    status: String,
    created_at: DateTime<Utc>,
}
impl BookingRecord {
    fn to_domain(self) -> PortResult<Booking> {
        Ok(Booking {
            id: self.id,
            student_id: self.student_id,
            tutor_id: self.tutor_id,
            subject: self.subject,
            session_type: parse_enum(&self.session_type)?,
            date: self.session_date,
            time: self.session_time,
            status: parse_enum(&self.status)?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct RatingRecord {
    id: Uuid,
    student_id: Uuid,
    teacher_id: Uuid,
    session_id: Uuid,
    score: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}
impl RatingRecord {
    fn to_domain(self) -> PortResult<Rating> {
        let score = u8::try_from(self.score)
            .map_err(|_| PortError::Unexpected(format!("rating {} has score {}", self.id, self.score)))?;
        Ok(Rating {
            id: self.id,
            student_id: self.student_id,
            teacher_id: self.teacher_id,
            session_id: self.session_id,
            score,
            comment: self.comment,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct NotificationRecord {
    id: Uuid,
    user_id: Uuid,
    user_role: String,
    kind: String,
    title: Json<LocalizedText>,
    message: Json<LocalizedText>,
    data: Option<Json<Value>>,
    is_read: bool,
    created_at: DateTime<Utc>,
}
impl NotificationRecord {
    fn to_domain(self) -> PortResult<Notification> {
        Ok(Notification {
            id: self.id,
            user_id: self.user_id,
            user_role: parse_enum(&self.user_role)?,
            kind: parse_enum(&self.kind)?,
            title: self.title.0,
            message: self.message.0,
            data: self.data.map(|d| d.0),
            is_read: self.is_read,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct MessageRecord {
    id: Uuid,
    sender_id: Uuid,
    sender_role: String,
    receiver_id: Uuid,
    receiver_role: String,
    body: String,
    message_type: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}
impl MessageRecord {
    fn to_domain(self) -> PortResult<Message> {
        Ok(Message {
            id: self.id,
            sender_id: self.sender_id,
            sender_role: parse_enum(&self.sender_role)?,
            receiver_id: self.receiver_id,
            receiver_role: parse_enum(&self.receiver_role)?,
            body: self.body,
            message_type: self.message_type,
            is_read: self.is_read,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// Private Query Helpers
//=========================================================================================

impl DbAdapter {
    async fn fetch_user_record(&self, role: UserRole, user_id: Uuid) -> PortResult<Option<UserRecord>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            user_columns(role),
            users_table(role)
        );
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn fetch_sessions(
        &self,
        filter: &SessionFilter,
        tail: &str,
        limit: Option<usize>,
    ) -> PortResult<Vec<Session>> {
        let sql = format!(
            "SELECT {} FROM sessions WHERE {} {} LIMIT $5",
            SESSION_COLUMNS, SESSION_FILTER, tail
        );
        let records = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(filter.id)
            .bind(filter.student_id)
            .bind(filter.teacher_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(limit.map(sql_limit))
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(SessionRecord::to_domain).collect()
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    // --- User Management ---

    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let role = new_user.details.role();
        let mut query = match &new_user.details {
            RoleDetails::Student { student_number } => sqlx::query(
                "INSERT INTO students (id, name, phone, email, university_name, student_number, \
                 hashed_password, preferences, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(new_user.id)
            .bind(&new_user.name)
            .bind(&new_user.phone)
            .bind(&new_user.email)
            .bind(&new_user.university_name)
            .bind(student_number),
            RoleDetails::Teacher { years_experience, gpa } => sqlx::query(
                "INSERT INTO teachers (id, name, phone, email, university_name, years_experience, \
                 gpa, hashed_password, preferences, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(new_user.id)
            .bind(&new_user.name)
            .bind(&new_user.phone)
            .bind(&new_user.email)
            .bind(&new_user.university_name)
            .bind(*years_experience)
            .bind(*gpa),
        };
        query = query
            .bind(&new_user.hashed_password)
            .bind(Json(&new_user.preferences))
            .bind(new_user.created_at);
        query.execute(&self.pool).await.map_err(conflict_or_unexpected)?;
        debug!(user_id = %new_user.id, role = %role, "Inserted user");

        Ok(User {
            id: new_user.id,
            name: new_user.name,
            phone: new_user.phone,
            email: new_user.email,
            university_name: new_user.university_name,
            details: new_user.details,
            preferences: new_user.preferences,
            created_at: new_user.created_at,
        })
    }

    async fn find_user(&self, role: UserRole, user_id: Uuid) -> PortResult<Option<User>> {
        self.fetch_user_record(role, user_id)
            .await?
            .map(|record| record.to_domain(role))
            .transpose()
    }

    async fn get_credentials_by_email(
        &self,
        role: UserRole,
        email: &str,
    ) -> PortResult<UserCredentials> {
        let sql = format!(
            "SELECT {} FROM {} WHERE LOWER(email) = LOWER($1)",
            user_columns(role),
            users_table(role)
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", role, email)))?;
        Ok(record.to_credentials(role))
    }

    async fn get_credentials_by_id(
        &self,
        role: UserRole,
        user_id: Uuid,
    ) -> PortResult<UserCredentials> {
        let record = self
            .fetch_user_record(role, user_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", role, user_id)))?;
        Ok(record.to_credentials(role))
    }

    async fn update_user_profile(
        &self,
        role: UserRole,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> PortResult<User> {
        let sql = format!(
            "UPDATE {} SET name = COALESCE($2, name), phone = COALESCE($3, phone), \
             university_name = COALESCE($4, university_name), \
             preferences = COALESCE($5, preferences) \
             WHERE id = $1 RETURNING {}",
            users_table(role),
            user_columns(role)
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .bind(update.name)
            .bind(update.phone)
            .bind(update.university_name)
            .bind(update.preferences.map(Json))
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", role, user_id)))?;
        record.to_domain(role)
    }

    async fn update_password_hash(
        &self,
        role: UserRole,
        user_id: Uuid,
        hashed_password: &str,
    ) -> PortResult<()> {
        let sql = format!("UPDATE {} SET hashed_password = $2 WHERE id = $1", users_table(role));
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(hashed_password)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("{} {} not found", role, user_id)));
        }
        Ok(())
    }

    async fn search_teachers(
        &self,
        university: Option<&str>,
        limit: usize,
    ) -> PortResult<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM teachers WHERE ($1::TEXT IS NULL OR university_name ILIKE $1) \
             ORDER BY created_at LIMIT $2",
            user_columns(UserRole::Teacher)
        );
        let records = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(university.map(contains_pattern))
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records
            .into_iter()
            .map(|record| record.to_domain(UserRole::Teacher))
            .collect()
    }

    // --- Auth Methods ---

    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO auth_sessions (token, user_id, role, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.token)
        .bind(session.identity.user_id)
        .bind(session.identity.role.as_str())
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn find_auth_session(&self, token: &str) -> PortResult<Option<AuthSession>> {
        sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT token, user_id, role, expires_at FROM auth_sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .map(AuthSessionRecord::to_domain)
        .transpose()
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    // --- Tutoring Sessions ---

    async fn insert_session(&self, session: Session) -> PortResult<()> {
        let sql = format!(
            "INSERT INTO sessions ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
            SESSION_COLUMNS
        );
        sqlx::query(&sql)
            .bind(session.id)
            .bind(session.teacher_id)
            .bind(session.student_id)
            .bind(&session.subject)
            .bind(session.session_type.as_str())
            .bind(&session.date)
            .bind(&session.time)
            .bind(session.duration_minutes)
            .bind(session.max_students)
            .bind(session.price)
            .bind(&session.notes)
            .bind(session.status.as_str())
            .bind(session.created_at)
            .bind(session.updated_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn find_session(&self, filter: &SessionFilter) -> PortResult<Option<Session>> {
        Ok(self.fetch_sessions(filter, "", Some(1)).await?.into_iter().next())
    }

    async fn find_sessions(
        &self,
        filter: &SessionFilter,
        limit: usize,
    ) -> PortResult<Vec<Session>> {
        self.fetch_sessions(filter, "ORDER BY created_at DESC", Some(limit)).await
    }

    async fn count_sessions(&self, filter: &SessionFilter) -> PortResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM sessions WHERE {}", SESSION_FILTER);
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(filter.id)
            .bind(filter.student_id)
            .bind(filter.teacher_id)
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(count.max(0) as u64)
    }

    async fn update_session_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        updated_at: DateTime<Utc>,
    ) -> PortResult<u64> {
        let result = sqlx::query("UPDATE sessions SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(session_id)
            .bind(status.as_str())
            .bind(updated_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    // --- Bookings ---

    async fn insert_booking(&self, booking: Booking) -> PortResult<()> {
        let sql = format!(
            "INSERT INTO bookings ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            BOOKING_COLUMNS
        );
        sqlx::query(&sql)
            .bind(booking.id)
            .bind(booking.student_id)
            .bind(booking.tutor_id)
            .bind(&booking.subject)
            .bind(booking.session_type.as_str())
            .bind(&booking.date)
            .bind(&booking.time)
            .bind(booking.status.as_str())
            .bind(booking.created_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn find_booking(
        &self,
        booking_id: Uuid,
        student_id: Uuid,
    ) -> PortResult<Option<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE id = $1 AND student_id = $2",
            BOOKING_COLUMNS
        );
        sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(booking_id)
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .map(BookingRecord::to_domain)
            .transpose()
    }

    async fn find_bookings_for_student(
        &self,
        student_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE student_id = $1 ORDER BY created_at LIMIT $2",
            BOOKING_COLUMNS
        );
        let records = sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(student_id)
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(BookingRecord::to_domain).collect()
    }

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        student_id: Uuid,
        status: BookingStatus,
    ) -> PortResult<u64> {
        let result =
            sqlx::query("UPDATE bookings SET status = $3 WHERE id = $1 AND student_id = $2")
                .bind(booking_id)
                .bind(student_id)
                .bind(status.as_str())
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    // --- Ratings ---

    async fn insert_rating(&self, rating: Rating) -> PortResult<()> {
        let sql = format!(
            "INSERT INTO ratings ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            RATING_COLUMNS
        );
        sqlx::query(&sql)
            .bind(rating.id)
            .bind(rating.student_id)
            .bind(rating.teacher_id)
            .bind(rating.session_id)
            .bind(i16::from(rating.score))
            .bind(&rating.comment)
            .bind(rating.created_at)
            .execute(&self.pool)
            .await
            .map_err(conflict_or_unexpected)?;
        Ok(())
    }

    async fn find_ratings_for_teacher(
        &self,
        teacher_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Rating>> {
        let sql = format!(
            "SELECT {} FROM ratings WHERE teacher_id = $1 ORDER BY created_at DESC LIMIT $2",
            RATING_COLUMNS
        );
        let records = sqlx::query_as::<_, RatingRecord>(&sql)
            .bind(teacher_id)
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(RatingRecord::to_domain).collect()
    }

    // --- Notifications ---

    async fn insert_notification(&self, notification: Notification) -> PortResult<()> {
        let sql = format!(
            "INSERT INTO notifications ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            NOTIFICATION_COLUMNS
        );
        sqlx::query(&sql)
            .bind(notification.id)
            .bind(notification.user_id)
            .bind(notification.user_role.as_str())
            .bind(notification.kind.as_str())
            .bind(Json(&notification.title))
            .bind(Json(&notification.message))
            .bind(notification.data.as_ref().map(Json))
            .bind(notification.is_read)
            .bind(notification.created_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn find_notifications_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Notification>> {
        let sql = format!(
            "SELECT {} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
            NOTIFICATION_COLUMNS
        );
        let records = sqlx::query_as::<_, NotificationRecord>(&sql)
            .bind(user_id)
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(NotificationRecord::to_domain).collect()
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> PortResult<u64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(notification_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> PortResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    // --- Messages ---

    async fn insert_message(&self, message: Message) -> PortResult<()> {
        let sql = format!(
            "INSERT INTO messages ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            MESSAGE_COLUMNS
        );
        sqlx::query(&sql)
            .bind(message.id)
            .bind(message.sender_id)
            .bind(message.sender_role.as_str())
            .bind(message.receiver_id)
            .bind(message.receiver_role.as_str())
            .bind(&message.body)
            .bind(&message.message_type)
            .bind(message.is_read)
            .bind(message.created_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn find_messages_for_participant(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Message>> {
        let sql = format!(
            "SELECT {} FROM messages WHERE sender_id = $1 OR receiver_id = $1 \
             ORDER BY created_at DESC LIMIT $2",
            MESSAGE_COLUMNS
        );
        let records = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(user_id)
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(MessageRecord::to_domain).collect()
    }

    async fn mark_messages_read(&self, receiver_id: Uuid, sender_id: Uuid) -> PortResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = TRUE \
             WHERE receiver_id = $1 AND sender_id = $2 AND is_read = FALSE",
        )
        .bind(receiver_id)
        .bind(sender_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.rows_affected())
    }
}

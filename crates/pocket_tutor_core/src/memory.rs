//! crates/pocket_tutor_core/src/memory.rs
//!
//! In-memory implementation of the `DatabaseService` port. Used by the test
//! suites and by the service when no database URL is configured.
//!
//! All collections live behind a single lock so that uniqueness checks and
//! the insert they guard happen atomically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::domain::{
    AuthSession, Booking, BookingStatus, Message, NewUser, Notification, ProfileUpdate, Rating,
    RoleDetails, Session, SessionStatus, User, UserCredentials, UserRole,
};
use crate::ports::{DatabaseService, PortError, PortResult, SessionFilter};

struct StoredUser {
    user: User,
    hashed_password: String,
}

#[derive(Default)]
struct Tables {
    students: HashMap<Uuid, StoredUser>,
    teachers: HashMap<Uuid, StoredUser>,
    auth_sessions: HashMap<String, AuthSession>,
    // Insertion-ordered collections
    sessions: Vec<Session>,
    bookings: Vec<Booking>,
    ratings: Vec<Rating>,
    notifications: Vec<Notification>,
    messages: Vec<Message>,
}

impl Tables {
    fn partition(&self, role: UserRole) -> &HashMap<Uuid, StoredUser> {
        match role {
            UserRole::Student => &self.students,
            UserRole::Teacher => &self.teachers,
        }
    }

    fn partition_mut(&mut self, role: UserRole) -> &mut HashMap<Uuid, StoredUser> {
        match role {
            UserRole::Student => &mut self.students,
            UserRole::Teacher => &mut self.teachers,
        }
    }
}

/// In-memory document store
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> PortResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| PortError::Unexpected("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> PortResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| PortError::Unexpected("in-memory store lock poisoned".to_string()))
    }
}

/// Newest first; among equal timestamps the later insert wins.
fn newest_first<'a, T: 'a, I>(items: I, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<&'a T>
where
    I: DoubleEndedIterator<Item = &'a T>,
{
    let mut out: Vec<&T> = items.rev().collect();
    out.sort_by(|a, b| created_at(*b).cmp(&created_at(*a)));
    out
}

fn credentials(stored: &StoredUser) -> UserCredentials {
    UserCredentials {
        user_id: stored.user.id,
        role: stored.user.role(),
        email: stored.user.email.clone(),
        hashed_password: stored.hashed_password.clone(),
    }
}

#[async_trait]
impl DatabaseService for InMemoryDatabase {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut tables = self.write()?;
        let role = new_user.details.role();
        let email = new_user.email.to_lowercase();
        let partition = tables.partition(role);

        if partition.values().any(|u| u.user.email.to_lowercase() == email) {
            return Err(PortError::Conflict(format!("{} with this email already exists", role)));
        }
        if let RoleDetails::Student { student_number } = &new_user.details {
            let taken = partition.values().any(|u| {
                matches!(&u.user.details, RoleDetails::Student { student_number: n } if n == student_number)
            });
            if taken {
                return Err(PortError::Conflict("Student ID already exists".to_string()));
            }
        }

        let user = User {
            id: new_user.id,
            name: new_user.name,
            phone: new_user.phone,
            email: new_user.email,
            university_name: new_user.university_name,
            details: new_user.details,
            preferences: new_user.preferences,
            created_at: new_user.created_at,
        };
        tables.partition_mut(role).insert(
            user.id,
            StoredUser { user: user.clone(), hashed_password: new_user.hashed_password },
        );
        Ok(user)
    }

    async fn find_user(&self, role: UserRole, user_id: Uuid) -> PortResult<Option<User>> {
        Ok(self.read()?.partition(role).get(&user_id).map(|s| s.user.clone()))
    }

    async fn get_credentials_by_email(
        &self,
        role: UserRole,
        email: &str,
    ) -> PortResult<UserCredentials> {
        let email = email.to_lowercase();
        self.read()?
            .partition(role)
            .values()
            .find(|s| s.user.email.to_lowercase() == email)
            .map(credentials)
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", role, email)))
    }

    async fn get_credentials_by_id(
        &self,
        role: UserRole,
        user_id: Uuid,
    ) -> PortResult<UserCredentials> {
        self.read()?
            .partition(role)
            .get(&user_id)
            .map(credentials)
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", role, user_id)))
    }

    async fn update_user_profile(
        &self,
        role: UserRole,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> PortResult<User> {
        let mut tables = self.write()?;
        let stored = tables
            .partition_mut(role)
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", role, user_id)))?;

        if let Some(name) = update.name {
            stored.user.name = name;
        }
        if let Some(phone) = update.phone {
            stored.user.phone = phone;
        }
        if let Some(university_name) = update.university_name {
            stored.user.university_name = university_name;
        }
        if let Some(preferences) = update.preferences {
            stored.user.preferences = preferences;
        }
        Ok(stored.user.clone())
    }

    async fn update_password_hash(
        &self,
        role: UserRole,
        user_id: Uuid,
        hashed_password: &str,
    ) -> PortResult<()> {
        let mut tables = self.write()?;
        let stored = tables
            .partition_mut(role)
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", role, user_id)))?;
        stored.hashed_password = hashed_password.to_string();
        Ok(())
    }

    async fn search_teachers(
        &self,
        university: Option<&str>,
        limit: usize,
    ) -> PortResult<Vec<User>> {
        let needle = university.map(str::to_lowercase);
        let tables = self.read()?;
        let mut teachers: Vec<User> = tables
            .teachers
            .values()
            .filter(|s| {
                needle
                    .as_deref()
                    .map_or(true, |n| s.user.university_name.to_lowercase().contains(n))
            })
            .map(|s| s.user.clone())
            .collect();
        teachers.sort_by_key(|u| u.created_at);
        teachers.truncate(limit);
        Ok(teachers)
    }

    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()> {
        self.write()?.auth_sessions.insert(session.token.clone(), session);
        Ok(())
    }

    async fn find_auth_session(&self, token: &str) -> PortResult<Option<AuthSession>> {
        Ok(self.read()?.auth_sessions.get(token).cloned())
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        self.write()?.auth_sessions.remove(token);
        Ok(())
    }

    async fn insert_session(&self, session: Session) -> PortResult<()> {
        self.write()?.sessions.push(session);
        Ok(())
    }

    async fn find_session(&self, filter: &SessionFilter) -> PortResult<Option<Session>> {
        Ok(self.read()?.sessions.iter().find(|s| filter.matches(s)).cloned())
    }

    async fn find_sessions(
        &self,
        filter: &SessionFilter,
        limit: usize,
    ) -> PortResult<Vec<Session>> {
        let tables = self.read()?;
        Ok(newest_first(tables.sessions.iter(), |s: &Session| s.created_at)
            .into_iter()
            .filter(|s| filter.matches(s))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_sessions(&self, filter: &SessionFilter) -> PortResult<u64> {
        Ok(self.read()?.sessions.iter().filter(|s| filter.matches(s)).count() as u64)
    }

    async fn update_session_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        updated_at: DateTime<Utc>,
    ) -> PortResult<u64> {
        let mut tables = self.write()?;
        let mut matched = 0;
        for session in tables.sessions.iter_mut().filter(|s| s.id == session_id) {
            session.status = status;
            session.updated_at = Some(updated_at);
            matched += 1;
        }
        Ok(matched)
    }

    async fn insert_booking(&self, booking: Booking) -> PortResult<()> {
        self.write()?.bookings.push(booking);
        Ok(())
    }

    async fn find_booking(
        &self,
        booking_id: Uuid,
        student_id: Uuid,
    ) -> PortResult<Option<Booking>> {
        Ok(self
            .read()?
            .bookings
            .iter()
            .find(|b| b.id == booking_id && b.student_id == student_id)
            .cloned())
    }

    async fn find_bookings_for_student(
        &self,
        student_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Booking>> {
        Ok(self
            .read()?
            .bookings
            .iter()
            .filter(|b| b.student_id == student_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        student_id: Uuid,
        status: BookingStatus,
    ) -> PortResult<u64> {
        let mut tables = self.write()?;
        let mut matched = 0;
        for booking in tables
            .bookings
            .iter_mut()
            .filter(|b| b.id == booking_id && b.student_id == student_id)
        {
            booking.status = status;
            matched += 1;
        }
        Ok(matched)
    }

    async fn insert_rating(&self, rating: Rating) -> PortResult<()> {
        let mut tables = self.write()?;
        let duplicate = tables
            .ratings
            .iter()
            .any(|r| r.student_id == rating.student_id && r.session_id == rating.session_id);
        if duplicate {
            return Err(PortError::Conflict("Rating already exists for this session".to_string()));
        }
        tables.ratings.push(rating);
        Ok(())
    }

    async fn find_ratings_for_teacher(
        &self,
        teacher_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Rating>> {
        let tables = self.read()?;
        Ok(newest_first(tables.ratings.iter(), |r: &Rating| r.created_at)
            .into_iter()
            .filter(|r| r.teacher_id == teacher_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn insert_notification(&self, notification: Notification) -> PortResult<()> {
        self.write()?.notifications.push(notification);
        Ok(())
    }

    async fn find_notifications_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Notification>> {
        let tables = self.read()?;
        Ok(newest_first(tables.notifications.iter(), |n: &Notification| n.created_at)
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> PortResult<u64> {
        let mut tables = self.write()?;
        let mut matched = 0;
        for n in tables
            .notifications
            .iter_mut()
            .filter(|n| n.id == notification_id && n.user_id == user_id)
        {
            n.is_read = true;
            matched += 1;
        }
        Ok(matched)
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> PortResult<u64> {
        let mut tables = self.write()?;
        let mut matched = 0;
        for n in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            matched += 1;
        }
        Ok(matched)
    }

    async fn insert_message(&self, message: Message) -> PortResult<()> {
        self.write()?.messages.push(message);
        Ok(())
    }

    async fn find_messages_for_participant(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> PortResult<Vec<Message>> {
        let tables = self.read()?;
        Ok(newest_first(tables.messages.iter(), |m: &Message| m.created_at)
            .into_iter()
            .filter(|m| m.sender_id == user_id || m.receiver_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_messages_read(&self, receiver_id: Uuid, sender_id: Uuid) -> PortResult<u64> {
        let mut tables = self.write()?;
        let mut matched = 0;
        for m in tables
            .messages
            .iter_mut()
            .filter(|m| m.receiver_id == receiver_id && m.sender_id == sender_id && !m.is_read)
        {
            m.is_read = true;
            matched += 1;
        }
        Ok(matched)
    }
}

//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use pocket_tutor_core::ports::{CompletionService, DatabaseService, PushNotifier};
use pocket_tutor_core::{
    BookingService, EducationalAssistant, MessagingService, NotificationDispatcher,
    RatingService, SessionService, TeacherService, TokenIdentityResolver,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub identity: TokenIdentityResolver,
    pub sessions: SessionService,
    pub bookings: BookingService,
    pub ratings: RatingService,
    pub notifications: NotificationDispatcher,
    pub messaging: MessagingService,
    pub teachers: TeacherService,
    pub assistant: EducationalAssistant,
}

impl AppState {
    /// Wires every domain service to the same store and notification dispatcher.
    pub fn new(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        push: Arc<dyn PushNotifier>,
        completion: Option<Arc<dyn CompletionService>>,
    ) -> Self {
        let notifications = NotificationDispatcher::new(db.clone(), push);
        Self {
            identity: TokenIdentityResolver::new(db.clone()),
            sessions: SessionService::new(db.clone(), notifications.clone()),
            bookings: BookingService::new(db.clone()),
            ratings: RatingService::new(db.clone(), notifications.clone()),
            messaging: MessagingService::new(db.clone(), notifications.clone()),
            teachers: TeacherService::new(db.clone()),
            assistant: EducationalAssistant::new(completion),
            notifications,
            config,
            db,
        }
    }
}

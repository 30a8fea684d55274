pub mod assistant;
pub mod domain;
pub mod identity;
pub mod localization;
pub mod memory;
pub mod messaging;
pub mod notifications;
pub mod ports;
pub mod ratings;
pub mod sessions;
pub mod teachers;
pub mod validation;

pub use assistant::{AssistantReply, AssistantRequest, EducationalAssistant};
pub use domain::{
    AuthSession, Booking, BookingStatus, Conversation, DashboardStats, Identity, LocalizedText,
    Message, NewBooking, NewMessage, NewRating, NewSession, NewUser, Notification,
    NotificationKind, ProfileUpdate, Rating, RatingStats, RoleDetails, Session, SessionStatus,
    SessionType, TeacherRating, TeacherSearch, TeacherSummary, User, UserCredentials, UserRole,
};
pub use identity::TokenIdentityResolver;
pub use memory::InMemoryDatabase;
pub use messaging::MessagingService;
pub use notifications::{NotificationDispatcher, NotificationDraft};
pub use ports::{
    CompletionService, DatabaseService, IdentityResolver, PortError, PortResult, PushNotifier,
    SessionFilter,
};
pub use ratings::RatingService;
pub use sessions::{BookingService, SessionService};
pub use teachers::TeacherService;

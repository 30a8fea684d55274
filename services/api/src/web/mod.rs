pub mod assistant;
pub mod auth;
pub mod bookings;
pub mod extract;
pub mod messages;
pub mod middleware;
pub mod notifications;
pub mod ratings;
pub mod rest;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod teachers;

// Re-export what the binaries need to build the server.
pub use middleware::require_auth;
pub use routes::create_router;

//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use pocket_tutor_core::domain::{Identity, UserRole};
use pocket_tutor_core::ports::{IdentityResolver, PortError};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;

/// The raw bearer token of the current request, kept so logout can revoke it.
#[derive(Clone, Debug)]
pub struct BearerToken(pub String);

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware that validates the `Authorization: Bearer` token.
///
/// If valid, inserts the caller's `Identity` and the token into request
/// extensions for handlers to use. Otherwise responds 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req)
        .ok_or(PortError::Unauthenticated)?
        .to_string();

    let identity = state.identity.resolve(&token).await.map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        e
    })?;

    req.extensions_mut().insert(identity);
    req.extensions_mut().insert(BearerToken(token));
    Ok(next.run(req).await)
}

/// Role guard for routes reserved to one partition. Returns the caller's id.
pub fn require_role(identity: &Identity, role: UserRole) -> Result<Uuid, ApiError> {
    if identity.role != role {
        return Err(PortError::Forbidden(format!("This action requires a {} account", role)).into());
    }
    Ok(identity.user_id)
}

//! Resolves opaque bearer tokens issued at login into caller identities.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{AuthSession, Identity};
use crate::ports::{DatabaseService, IdentityResolver, PortError, PortResult};

#[derive(Clone)]
pub struct TokenIdentityResolver {
    db: Arc<dyn DatabaseService>,
}

impl TokenIdentityResolver {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Issues and stores a fresh token for `identity`.
    pub async fn issue(&self, identity: Identity, ttl: Duration) -> PortResult<AuthSession> {
        let session = AuthSession {
            token: Uuid::new_v4().simple().to_string(),
            identity,
            expires_at: Utc::now() + ttl,
        };
        self.db.create_auth_session(session.clone()).await?;
        Ok(session)
    }

    pub async fn revoke(&self, token: &str) -> PortResult<()> {
        self.db.delete_auth_session(token).await
    }

    fn is_expired(session: &AuthSession, now: DateTime<Utc>) -> bool {
        session.expires_at <= now
    }
}

#[async_trait]
impl IdentityResolver for TokenIdentityResolver {
    async fn resolve(&self, token: &str) -> PortResult<Identity> {
        let session = self
            .db
            .find_auth_session(token)
            .await?
            .ok_or(PortError::Unauthenticated)?;
        if Self::is_expired(&session, Utc::now()) {
            // Expired tokens are dropped on first use.
            self.db.delete_auth_session(token).await?;
            debug!(user_id = %session.identity.user_id, "Rejected and removed expired token");
            return Err(PortError::Unauthenticated);
        }
        Ok(session.identity)
    }
}

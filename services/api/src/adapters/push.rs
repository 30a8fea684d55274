//! services/api/src/adapters/push.rs
//!
//! Push delivery is not wired to any transport. Notifications are persisted
//! by the dispatcher; this adapter only records that a push would happen.

use async_trait::async_trait;
use pocket_tutor_core::domain::Notification;
use pocket_tutor_core::ports::{PortResult, PushNotifier};
use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct LoggingPushNotifier;

#[async_trait]
impl PushNotifier for LoggingPushNotifier {
    async fn push(&self, notification: &Notification) -> PortResult<()> {
        debug!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            kind = %notification.kind,
            "Push delivery skipped (no transport configured)"
        );
        Ok(())
    }
}

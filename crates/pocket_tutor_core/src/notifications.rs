//! crates/pocket_tutor_core/src/notifications.rs
//!
//! The notification dispatcher: the only write path for `Notification`
//! records. Other services hand it a `NotificationDraft` after their own
//! mutation succeeded; it persists the record and then attempts a
//! best-effort push delivery whose failure never reaches the caller.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{LocalizedText, Notification, NotificationKind, UserRole};
use crate::ports::{DatabaseService, PortError, PortResult, PushNotifier};

pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Everything needed to build a notification, minus the bookkeeping fields.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub user_id: Uuid,
    pub user_role: UserRole,
    pub kind: NotificationKind,
    pub title: LocalizedText,
    pub message: LocalizedText,
    pub data: Option<Value>,
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    db: Arc<dyn DatabaseService>,
    push: Arc<dyn PushNotifier>,
}

impl NotificationDispatcher {
    pub fn new(db: Arc<dyn DatabaseService>, push: Arc<dyn PushNotifier>) -> Self {
        Self { db, push }
    }

    /// Persists an unread notification stamped with the current time.
    pub async fn notify(&self, draft: NotificationDraft) -> PortResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: draft.user_id,
            user_role: draft.user_role,
            kind: draft.kind,
            title: draft.title,
            message: draft.message,
            data: draft.data,
            is_read: false,
            created_at: Utc::now(),
        };
        self.db.insert_notification(notification.clone()).await?;
        info!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            kind = %notification.kind,
            "Notification recorded"
        );

        if let Err(e) = self.push.push(&notification).await {
            warn!(notification_id = %notification.id, "Push delivery failed: {}", e);
        }
        Ok(notification)
    }

    /// Most recent first.
    pub async fn list(&self, user_id: Uuid, limit: Option<usize>) -> PortResult<Vec<Notification>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        self.db.find_notifications_for_user(user_id, limit).await
    }

    /// Absent and not-owned notifications are indistinguishable.
    pub async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> PortResult<()> {
        let matched = self.db.mark_notification_read(notification_id, user_id).await?;
        if matched == 0 {
            return Err(PortError::NotFound("Notification not found".to_string()));
        }
        Ok(())
    }

    /// Idempotent; returns how many notifications flipped to read.
    pub async fn mark_all_read(&self, user_id: Uuid) -> PortResult<u64> {
        let updated = self.db.mark_all_notifications_read(user_id).await?;
        info!(user_id = %user_id, updated, "Marked all notifications read");
        Ok(updated)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every pushed notification id; optionally fails every push.
    #[derive(Default)]
    pub struct RecordingPush {
        pub pushed: Mutex<Vec<Uuid>>,
        pub fail: bool,
    }

    #[async_trait]
    impl PushNotifier for RecordingPush {
        async fn push(&self, notification: &Notification) -> PortResult<()> {
            self.pushed.lock().unwrap().push(notification.id);
            if self.fail {
                return Err(PortError::Unexpected("push provider down".to_string()));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingPush;
    use super::*;
    use crate::localization::{MESSAGE_BODY, MESSAGE_TITLE};
    use crate::memory::InMemoryDatabase;

    fn draft(user_id: Uuid) -> NotificationDraft {
        NotificationDraft {
            user_id,
            user_role: UserRole::Student,
            kind: NotificationKind::NewMessage,
            title: MESSAGE_TITLE.render(&[]),
            message: MESSAGE_BODY.render(&[("name", "Omar")]),
            data: None,
        }
    }

    fn dispatcher(push: Arc<RecordingPush>) -> NotificationDispatcher {
        NotificationDispatcher::new(Arc::new(InMemoryDatabase::new()), push)
    }

    #[tokio::test]
    async fn notify_persists_unread_and_pushes() {
        let push = Arc::new(RecordingPush::default());
        let dispatcher = dispatcher(push.clone());
        let user = Uuid::new_v4();

        let created = dispatcher.notify(draft(user)).await.unwrap();

        assert!(!created.is_read);
        let listed = dispatcher.list(user, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(*push.pushed.lock().unwrap(), vec![created.id]);
    }

    #[tokio::test]
    async fn push_failure_is_swallowed() {
        let push = Arc::new(RecordingPush { fail: true, ..Default::default() });
        let dispatcher = dispatcher(push);

        assert!(dispatcher.notify(draft(Uuid::new_v4())).await.is_ok());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_bounded() {
        let dispatcher = dispatcher(Arc::new(RecordingPush::default()));
        let user = Uuid::new_v4();
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(dispatcher.notify(draft(user)).await.unwrap().id);
        }

        let listed = dispatcher.list(user, Some(2)).await.unwrap();
        let listed_ids: Vec<Uuid> = listed.iter().map(|n| n.id).collect();
        assert_eq!(listed_ids, vec![ids[2], ids[1]]);
    }

    #[tokio::test]
    async fn mark_read_by_non_owner_looks_like_missing() {
        let dispatcher = dispatcher(Arc::new(RecordingPush::default()));
        let owner = Uuid::new_v4();
        let created = dispatcher.notify(draft(owner)).await.unwrap();

        let foreign = dispatcher.mark_read(created.id, Uuid::new_v4()).await.unwrap_err();
        let missing = dispatcher.mark_read(Uuid::new_v4(), owner).await.unwrap_err();
        assert_eq!(foreign, missing);

        dispatcher.mark_read(created.id, owner).await.unwrap();
        assert!(dispatcher.list(owner, None).await.unwrap()[0].is_read);
    }

    #[tokio::test]
    async fn mark_all_read_is_idempotent() {
        let dispatcher = dispatcher(Arc::new(RecordingPush::default()));
        let user = Uuid::new_v4();
        dispatcher.notify(draft(user)).await.unwrap();
        dispatcher.notify(draft(user)).await.unwrap();

        assert_eq!(dispatcher.mark_all_read(user).await.unwrap(), 2);
        assert_eq!(dispatcher.mark_all_read(user).await.unwrap(), 0);
        assert_eq!(dispatcher.mark_all_read(Uuid::new_v4()).await.unwrap(), 0);
    }
}

//! crates/pocket_tutor_core/src/messaging.rs
//!
//! Direct messages and the per-counterpart conversation view.

use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Conversation, Identity, Message, NewMessage, NotificationKind};
use crate::localization::{MESSAGE_BODY, MESSAGE_TITLE, UNKNOWN_USER_NAME};
use crate::notifications::{NotificationDispatcher, NotificationDraft};
use crate::ports::{DatabaseService, PortResult};
use crate::validation::check_length;

pub const DEFAULT_MESSAGE_TYPE: &str = "text";
const CONVERSATION_SCAN_LIMIT: usize = 1000;

/// Groups `messages` (newest first) by the participant that is not `user_id`.
///
/// Conversations come out ordered by their most recent message. Each keeps
/// its messages newest first and counts the unread ones addressed to `user_id`.
pub fn group_conversations(user_id: Uuid, messages: Vec<Message>) -> Vec<Conversation> {
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut conversations: Vec<Conversation> = Vec::new();

    for message in messages {
        let counterpart_id = if message.sender_id == user_id {
            message.receiver_id
        } else {
            message.sender_id
        };
        let unread = message.receiver_id == user_id && !message.is_read;

        let slot = *index.entry(counterpart_id).or_insert_with(|| {
            conversations.push(Conversation {
                counterpart_id,
                messages: Vec::new(),
                last_message: message.clone(),
                unread_count: 0,
            });
            conversations.len() - 1
        });
        let conversation = &mut conversations[slot];
        if unread {
            conversation.unread_count += 1;
        }
        conversation.messages.push(message);
    }
    conversations
}

#[derive(Clone)]
pub struct MessagingService {
    db: Arc<dyn DatabaseService>,
    notifications: NotificationDispatcher,
}

impl MessagingService {
    pub fn new(db: Arc<dyn DatabaseService>, notifications: NotificationDispatcher) -> Self {
        Self { db, notifications }
    }

    /// Stores the message and notifies the receiver.
    pub async fn send_message(&self, sender: Identity, input: NewMessage) -> PortResult<Message> {
        check_length("message", &input.body, 1, 1000)?;

        let message = Message {
            id: Uuid::new_v4(),
            sender_id: sender.user_id,
            sender_role: sender.role,
            receiver_id: input.receiver_id,
            receiver_role: input.receiver_role,
            body: input.body,
            message_type: input
                .message_type
                .unwrap_or_else(|| DEFAULT_MESSAGE_TYPE.to_string()),
            is_read: false,
            created_at: Utc::now(),
        };
        self.db.insert_message(message.clone()).await?;
        info!(
            message_id = %message.id,
            sender_id = %message.sender_id,
            receiver_id = %message.receiver_id,
            "Message sent"
        );

        let sender_name = self
            .db
            .find_user(sender.role, sender.user_id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string());

        self.notifications
            .notify(NotificationDraft {
                user_id: message.receiver_id,
                user_role: message.receiver_role,
                kind: NotificationKind::NewMessage,
                title: MESSAGE_TITLE.render(&[]),
                message: MESSAGE_BODY.render(&[("name", &sender_name)]),
                data: Some(json!({ "messageId": message.id })),
            })
            .await?;

        Ok(message)
    }

    pub async fn conversations(&self, caller: Identity) -> PortResult<Vec<Conversation>> {
        let messages = self
            .db
            .find_messages_for_participant(caller.user_id, CONVERSATION_SCAN_LIMIT)
            .await?;
        Ok(group_conversations(caller.user_id, messages))
    }

    /// Marks everything `counterpart_id` sent to the caller as read. Idempotent.
    pub async fn mark_conversation_read(
        &self,
        caller: Identity,
        counterpart_id: Uuid,
    ) -> PortResult<u64> {
        self.db.mark_messages_read(caller.user_id, counterpart_id).await
    }
}

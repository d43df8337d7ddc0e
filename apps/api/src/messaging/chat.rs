//! Chat room message flow: record, deliver, settle status, refresh the room.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::messaging::{DeliveryReceipt, MessageProvider, OutboundMessage};
use crate::models::candidate::Candidate;
use crate::models::chat::{Channel, ChatMessage, ChatRoom, MessageStatus, RoomStatus};
use crate::models::status::check_transition;
use crate::repo::{RepoError, Repositories};

const PREVIEW_CHARS: usize = 80;
const TOUCH_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub sender: String,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactRequest {
    pub channel: Channel,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    pub candidate_id: String,
    pub recipient: String,
    pub receipt: DeliveryReceipt,
}

fn preview(body: &str) -> String {
    let mut chars = body.trim().chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

async fn find_room(repos: &Repositories, room_id: &str) -> Result<ChatRoom, AppError> {
    repos
        .chat_rooms
        .get(room_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("chat room '{room_id}' not found")))
}

/// Messages of one room, oldest first.
pub async fn room_messages(
    repos: &Repositories,
    room_id: &str,
) -> Result<Vec<ChatMessage>, AppError> {
    find_room(repos, room_id).await?;
    let mut messages: Vec<ChatMessage> = repos
        .messages
        .list()
        .await?
        .iter()
        .filter(|m| m.room_id == room_id)
        .cloned()
        .collect();
    messages.sort_by_key(|m| m.sent_at);
    Ok(messages)
}

/// Hands a `sending` message to the provider (external rooms only) and
/// returns it settled as `sent` or `failed`.
async fn deliver(
    provider: &dyn MessageProvider,
    room: &ChatRoom,
    mut message: ChatMessage,
) -> Result<ChatMessage, AppError> {
    let outcome = if room.channel.is_external() {
        let outbound = OutboundMessage {
            channel: room.channel,
            recipient: room.contact_address.clone().unwrap_or_default(),
            body: message.body.clone(),
        };
        provider.send(outbound).await
    } else {
        Ok(DeliveryReceipt {
            provider_message_id: String::new(),
            channel: Channel::Internal,
            accepted_at: Utc::now(),
        })
    };

    let next = match outcome {
        Ok(receipt) => {
            message.failure_reason = None;
            if !receipt.provider_message_id.is_empty() {
                message.provider_message_id = Some(receipt.provider_message_id);
            }
            MessageStatus::Sent
        }
        Err(e) => {
            warn!("Message {} in room {} failed: {e}", message.id, room.id);
            message.failure_reason = Some(e.to_string());
            MessageStatus::Failed
        }
    };
    check_transition(message.status, next)?;
    message.status = next;
    Ok(message)
}

/// Records the settled message as the room's latest activity. Only the
/// activity fields are written; anything else changed on the room while the
/// message was in flight is kept.
async fn touch_room(
    repos: &Repositories,
    room_id: &str,
    message: &ChatMessage,
) -> Result<(), AppError> {
    for _ in 0..TOUCH_ATTEMPTS {
        let Some(current) = repos.chat_rooms.get(room_id).await? else {
            warn!(
                "Chat room {room_id} was deleted before message {} settled",
                message.id
            );
            return Ok(());
        };
        let touched = ChatRoom {
            last_message_preview: Some(preview(&message.body)),
            last_message_at: Some(message.sent_at),
            unread: 0,
            ..current.clone()
        };
        match repos.chat_rooms.swap(&current, touched).await {
            Ok(_) => return Ok(()),
            Err(RepoError::Stale { .. }) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::Conflict(format!(
        "chat room '{room_id}' kept changing; activity for message {} not recorded",
        message.id
    )))
}

pub async fn send_message(
    repos: &Repositories,
    provider: &dyn MessageProvider,
    room_id: &str,
    req: SendMessageRequest,
) -> Result<ChatMessage, AppError> {
    let room = find_room(repos, room_id).await?;
    if room.status == RoomStatus::Archived {
        return Err(AppError::UnprocessableEntity(format!(
            "chat room '{room_id}' is archived"
        )));
    }
    if req.sender.trim().is_empty() {
        return Err(AppError::Validation("sender is required".to_string()));
    }
    if req.body.trim().is_empty() {
        return Err(AppError::Validation("body is required".to_string()));
    }

    let pending = ChatMessage {
        id: Uuid::new_v4().to_string(),
        room_id: room.id.clone(),
        sender: req.sender.trim().to_string(),
        body: req.body,
        sent_at: Utc::now(),
        status: MessageStatus::Sending,
        failure_reason: None,
        provider_message_id: None,
    };
    repos.messages.insert(pending.clone()).await?;

    let settled = deliver(provider, &room, pending.clone()).await?;
    repos.messages.swap(&pending, settled.clone()).await?;
    touch_room(repos, &room.id, &settled).await?;

    info!(
        "Message {} in room {} is {:?}",
        settled.id, settled.room_id, settled.status
    );
    Ok(settled)
}

/// Re-sends a failed message.
pub async fn retry_message(
    repos: &Repositories,
    provider: &dyn MessageProvider,
    room_id: &str,
    message_id: &str,
) -> Result<ChatMessage, AppError> {
    let room = find_room(repos, room_id).await?;
    if room.status == RoomStatus::Archived {
        return Err(AppError::UnprocessableEntity(format!(
            "chat room '{room_id}' is archived"
        )));
    }
    let message = repos
        .messages
        .get(message_id)
        .await?
        .filter(|m| m.room_id == room_id)
        .ok_or_else(|| {
            AppError::NotFound(format!("message '{message_id}' not found in room '{room_id}'"))
        })?;

    check_transition(message.status, MessageStatus::Sending)?;
    let pending = ChatMessage {
        status: MessageStatus::Sending,
        failure_reason: None,
        sent_at: Utc::now(),
        ..message.clone()
    };
    // a concurrent retry of the same message loses here with a 409
    repos.messages.swap(&message, pending.clone()).await?;

    let settled = deliver(provider, &room, pending.clone()).await?;
    repos.messages.swap(&pending, settled.clone()).await?;
    touch_room(repos, &room.id, &settled).await?;
    Ok(settled)
}

/// Sends a one-off message to a candidate over email, SMS or WhatsApp.
pub async fn contact_candidate(
    repos: &Repositories,
    provider: &dyn MessageProvider,
    candidate_id: &str,
    req: ContactRequest,
) -> Result<ContactResponse, AppError> {
    let candidate: Candidate = repos
        .candidates
        .get(candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("candidate '{candidate_id}' not found")))?;

    let recipient = match req.channel {
        Channel::Internal => {
            return Err(AppError::Validation(
                "candidates can only be contacted over email, sms or whatsapp".to_string(),
            ))
        }
        Channel::Email => candidate.email.clone(),
        Channel::Sms | Channel::Whatsapp => candidate.phone.clone().ok_or_else(|| {
            AppError::UnprocessableEntity(format!(
                "candidate '{candidate_id}' has no phone number"
            ))
        })?,
    };

    let receipt = provider
        .send(OutboundMessage {
            channel: req.channel,
            recipient: recipient.clone(),
            body: req.body,
        })
        .await?;
    info!(
        "Contacted candidate {candidate_id} via {}",
        req.channel.as_str()
    );

    Ok(ContactResponse {
        candidate_id: candidate.id,
        recipient,
        receipt,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::messaging::{DeliveryError, SimulatedProvider};

    fn provider() -> SimulatedProvider {
        SimulatedProvider::new(Duration::ZERO)
    }

    /// Archives the room while the message is in flight.
    struct ArchivingProvider {
        repos: Repositories,
        room_id: &'static str,
    }

    #[async_trait]
    impl MessageProvider for ArchivingProvider {
        async fn send(&self, message: OutboundMessage) -> Result<DeliveryReceipt, DeliveryError> {
            let room = self
                .repos
                .chat_rooms
                .get(self.room_id)
                .await
                .unwrap()
                .unwrap();
            check_transition(room.status, RoomStatus::Archived).unwrap();
            self.repos
                .chat_rooms
                .update(ChatRoom {
                    status: RoomStatus::Archived,
                    ..room
                })
                .await
                .unwrap();
            provider().send(message).await
        }
    }

    fn request(body: &str) -> SendMessageRequest {
        SendMessageRequest {
            sender: "Rivka Adler".to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_preview_truncates_long_bodies() {
        assert_eq!(preview("  short  "), "short");
        let long = "a".repeat(PREVIEW_CHARS + 5);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 1);
        assert!(p.ends_with('…'));
    }

    #[tokio::test]
    async fn test_send_on_whatsapp_room_marks_sent_and_resets_unread() {
        let repos = Repositories::seeded().unwrap();
        let msg = send_message(&repos, &provider(), "room-001", request("See you at 14:00"))
            .await
            .unwrap();

        assert_eq!(msg.status, MessageStatus::Sent);
        assert!(msg.provider_message_id.is_some());

        let room = repos.chat_rooms.get("room-001").await.unwrap().unwrap();
        assert_eq!(room.unread, 0);
        assert_eq!(room.last_message_preview.as_deref(), Some("See you at 14:00"));
        assert_eq!(room_messages(&repos, "room-001").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_room_archived_during_delivery_stays_archived() {
        let repos = Repositories::seeded().unwrap();
        let archiving = ArchivingProvider {
            repos: repos.clone(),
            room_id: "room-001",
        };
        let msg = send_message(&repos, &archiving, "room-001", request("Offer letter sent"))
            .await
            .unwrap();
        assert_eq!(msg.status, MessageStatus::Sent);

        let room = repos.chat_rooms.get("room-001").await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Archived);
        assert_eq!(room.last_message_preview.as_deref(), Some("Offer letter sent"));
        assert_eq!(room.unread, 0);
    }

    #[tokio::test]
    async fn test_bad_contact_address_marks_failed_then_retry_fails_again() {
        let repos = Repositories::seeded().unwrap();
        let mut room = repos.chat_rooms.get("room-002").await.unwrap().unwrap();
        room.contact_address = Some("not-an-address".to_string());
        repos.chat_rooms.update(room).await.unwrap();

        let msg = send_message(&repos, &provider(), "room-002", request("Role brief attached"))
            .await
            .unwrap();
        assert_eq!(msg.status, MessageStatus::Failed);
        assert!(msg.failure_reason.as_deref().unwrap().contains("not a valid email"));

        let retried = retry_message(&repos, &provider(), "room-002", &msg.id)
            .await
            .unwrap();
        assert_eq!(retried.status, MessageStatus::Failed);
    }

    #[tokio::test]
    async fn test_retry_of_delivered_message_rejected() {
        let repos = Repositories::seeded().unwrap();
        let err = retry_message(&repos, &provider(), "room-001", "msg-001")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[tokio::test]
    async fn test_archived_room_rejects_messages() {
        let repos = Repositories::seeded().unwrap();
        let mut room = repos.chat_rooms.get("room-003").await.unwrap().unwrap();
        room.status = RoomStatus::Archived;
        repos.chat_rooms.update(room).await.unwrap();

        let err = send_message(&repos, &provider(), "room-003", request("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[tokio::test]
    async fn test_contact_candidate_without_phone_over_sms() {
        let repos = Repositories::seeded().unwrap();
        let req = ContactRequest {
            channel: Channel::Sms,
            body: "Hi Avi".to_string(),
        };
        let err = contact_candidate(&repos, &provider(), "cand-002", req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[tokio::test]
    async fn test_contact_candidate_by_email() {
        let repos = Repositories::seeded().unwrap();
        let req = ContactRequest {
            channel: Channel::Email,
            body: "Thanks for applying".to_string(),
        };
        let resp = contact_candidate(&repos, &provider(), "cand-002", req)
            .await
            .unwrap();
        assert_eq!(resp.recipient, "avi.mizrahi@example.com");
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lfa::aggregate::{count, count_by};
use crate::lfa::filter::Filterable;
use crate::lfa::paginate::{SortValue, Sortable};
use crate::lfa::Record;
use crate::models::status::StatusMachine;
use crate::models::{require_text, Entity};
use crate::repo::{Repositories, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[default]
    Internal,
    Whatsapp,
    Sms,
    Email,
}

impl Channel {
    pub const ALL: &'static [Channel] = &[
        Channel::Internal,
        Channel::Whatsapp,
        Channel::Sms,
        Channel::Email,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Internal => "internal",
            Channel::Whatsapp => "whatsapp",
            Channel::Sms => "sms",
            Channel::Email => "email",
        }
    }

    /// Channels that leave the building and need a delivery provider.
    pub fn is_external(self) -> bool {
        !matches!(self, Channel::Internal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    #[default]
    Open,
    Archived,
}

impl StatusMachine for RoomStatus {
    const ENTITY: &'static str = "chat room";
    const INITIAL: Self = RoomStatus::Open;
    const VARIANTS: &'static [Self] = &[RoomStatus::Open, RoomStatus::Archived];

    fn as_str(self) -> &'static str {
        match self {
            RoomStatus::Open => "open",
            RoomStatus::Archived => "archived",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        match self {
            RoomStatus::Open => &[RoomStatus::Archived],
            RoomStatus::Archived => &[RoomStatus::Open],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoom {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub channel: Channel,
    /// Phone number or email address for external channels.
    #[serde(default)]
    pub contact_address: Option<String>,
    #[serde(default)]
    pub unread: u32,
    #[serde(default)]
    pub last_message_preview: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: RoomStatus,
}

impl Record for ChatRoom {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Filterable for ChatRoom {
    const CATEGORICAL_FIELDS: &'static [&'static str] = &["status", "channel"];
    const NUMERIC_FIELDS: &'static [&'static str] = &["unread"];

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.participants.iter().map(String::as_str));
        if let Some(preview) = &self.last_message_preview {
            fields.push(preview.as_str());
        }
        fields
    }

    fn categorical(&self, field: &str) -> Option<&str> {
        match field {
            "status" => Some(self.status.as_str()),
            "channel" => Some(self.channel.as_str()),
            _ => None,
        }
    }

    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "unread" => Some(f64::from(self.unread)),
            _ => None,
        }
    }
}

impl Sortable for ChatRoom {
    const SORT_FIELDS: &'static [&'static str] = &["name", "unread", "last_message_at"];

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "name" => Some(SortValue::Text(self.name.clone())),
            "unread" => Some(SortValue::Number(f64::from(self.unread))),
            "last_message_at" => self.last_message_at.map(|t| SortValue::Text(t.to_rfc3339())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRoomStats {
    pub total: usize,
    pub open: usize,
    pub total_unread: u64,
    pub by_channel: BTreeMap<&'static str, usize>,
}

impl Entity for ChatRoom {
    const KIND: &'static str = "chat room";
    const COLLECTION: &'static str = "chat-rooms";

    type Status = RoomStatus;
    type Stats = ChatRoomStats;

    fn status(&self) -> RoomStatus {
        self.status
    }

    fn with_status(&self, status: RoomStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    fn with_id(self, id: String) -> Self {
        Self { id, ..self }
    }

    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        require_text(&mut errors, "name", &self.name);
        let missing_contact = self
            .contact_address
            .as_deref()
            .map_or(true, |a| a.trim().is_empty());
        if self.channel.is_external() && missing_contact {
            errors.push(format!(
                "{} rooms need a contact_address",
                self.channel.as_str()
            ));
        }
        errors
    }

    fn summarize(store: &[Self]) -> ChatRoomStats {
        let channels: Vec<&'static str> = Channel::ALL.iter().map(|c| c.as_str()).collect();
        ChatRoomStats {
            total: store.len(),
            open: count(store, |r| r.status == RoomStatus::Open),
            total_unread: store.iter().map(|r| u64::from(r.unread)).sum(),
            by_channel: count_by(store, &channels, |r| r.channel.as_str()),
        }
    }

    fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
        &repos.chat_rooms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    #[default]
    Sending,
    Sent,
    Delivered,
    Failed,
}

impl StatusMachine for MessageStatus {
    const ENTITY: &'static str = "message";
    const INITIAL: Self = MessageStatus::Sending;
    const VARIANTS: &'static [Self] = &[
        MessageStatus::Sending,
        MessageStatus::Sent,
        MessageStatus::Delivered,
        MessageStatus::Failed,
    ];

    fn as_str(self) -> &'static str {
        match self {
            MessageStatus::Sending => "sending",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Failed => "failed",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        use MessageStatus::*;
        match self {
            Sending => &[Sent, Failed],
            Sent => &[Delivered],
            Delivered => &[],
            // retry
            Failed => &[Sending],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub room_id: String,
    pub sender: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub status: MessageStatus,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub provider_message_id: Option<String>,
}

impl Record for ChatMessage {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::status::check_transition;

    fn room(channel: Channel, contact: Option<&str>) -> ChatRoom {
        ChatRoom {
            id: "r1".to_string(),
            name: "Dana Cohen".to_string(),
            participants: vec!["Dana Cohen".to_string()],
            channel,
            contact_address: contact.map(str::to_string),
            unread: 3,
            last_message_preview: None,
            last_message_at: None,
            status: RoomStatus::Open,
        }
    }

    #[test]
    fn test_external_room_needs_contact_address() {
        assert_eq!(room(Channel::Whatsapp, None).validate().len(), 1);
        assert!(room(Channel::Whatsapp, Some("+972501234567")).validate().is_empty());
        assert!(room(Channel::Internal, None).validate().is_empty());
    }

    #[test]
    fn test_failed_message_can_retry() {
        assert!(check_transition(MessageStatus::Failed, MessageStatus::Sending).is_ok());
        assert!(check_transition(MessageStatus::Sent, MessageStatus::Sending).is_err());
    }

    #[test]
    fn test_stats_by_channel() {
        let store = vec![
            room(Channel::Whatsapp, Some("+1")),
            room(Channel::Internal, None),
        ];
        let stats = ChatRoom::summarize(&store);
        assert_eq!(stats.total_unread, 6);
        assert_eq!(stats.by_channel.get("whatsapp"), Some(&1));
        assert_eq!(stats.by_channel.get("email"), Some(&0));
    }

    #[test]
    fn test_unread_total_does_not_overflow() {
        let busy = ChatRoom {
            unread: 3_000_000_000,
            ..room(Channel::Internal, None)
        };
        let stats = ChatRoom::summarize(&[busy.clone(), busy]);
        assert_eq!(stats.total_unread, 6_000_000_000);
    }
}

//! Outbound messaging. The boundary between chat/contact flows and whatever
//! actually delivers WhatsApp, SMS and email.
//!
//! `AppState` holds an `Arc<dyn MessageProvider>`. The default
//! `SimulatedProvider` validates the message the way a real gateway would,
//! waits a configured latency and hands back a receipt.

pub mod chat;
pub mod handlers;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::chat::Channel;

const SMS_MAX_CHARS: usize = 1600;
const WHATSAPP_MAX_CHARS: usize = 4096;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    pub channel: Channel,
    /// Phone number for WhatsApp/SMS, address for email.
    pub recipient: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryReceipt {
    pub provider_message_id: String,
    pub channel: Channel,
    pub accepted_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("message body is empty")]
    EmptyBody,

    #[error("'{recipient}' is not a valid {channel} recipient")]
    InvalidRecipient {
        channel: &'static str,
        recipient: String,
    },

    #[error("{channel} messages are limited to {limit} characters, got {len}")]
    BodyTooLong {
        channel: &'static str,
        limit: usize,
        len: usize,
    },

    #[error("internal messages are not sent through a provider")]
    NotExternal,
}

/// Per-channel body limit, if any.
pub fn body_limit(channel: Channel) -> Option<usize> {
    match channel {
        Channel::Sms => Some(SMS_MAX_CHARS),
        Channel::Whatsapp => Some(WHATSAPP_MAX_CHARS),
        Channel::Email | Channel::Internal => None,
    }
}

fn is_phone_number(raw: &str) -> bool {
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    let digits: String = digits.chars().filter(|c| *c != ' ' && *c != '-').collect();
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_email_address(raw: &str) -> bool {
    match raw.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

/// Checks a message against the channel's addressing and length rules.
pub fn check_outbound(message: &OutboundMessage) -> Result<(), DeliveryError> {
    let channel = message.channel;
    if !channel.is_external() {
        return Err(DeliveryError::NotExternal);
    }
    if message.body.trim().is_empty() {
        return Err(DeliveryError::EmptyBody);
    }
    let recipient = message.recipient.trim();
    let valid = match channel {
        Channel::Email => is_email_address(recipient),
        _ => is_phone_number(recipient),
    };
    if !valid {
        return Err(DeliveryError::InvalidRecipient {
            channel: channel.as_str(),
            recipient: recipient.to_string(),
        });
    }
    if let Some(limit) = body_limit(channel) {
        let len = message.body.chars().count();
        if len > limit {
            return Err(DeliveryError::BodyTooLong {
                channel: channel.as_str(),
                limit,
                len,
            });
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Delivery backend. Implement this to plug in a real gateway without
/// touching the chat or contact handlers.
#[async_trait]
pub trait MessageProvider: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<DeliveryReceipt, DeliveryError>;
}

// ────────────────────────────────────────────────────────────────────────────
// SimulatedProvider (default)
// ────────────────────────────────────────────────────────────────────────────

pub struct SimulatedProvider {
    latency: Duration,
}

impl SimulatedProvider {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl MessageProvider for SimulatedProvider {
    async fn send(&self, message: OutboundMessage) -> Result<DeliveryReceipt, DeliveryError> {
        check_outbound(&message)?;
        debug!(
            "Simulating {} delivery to {} ({}ms)",
            message.channel.as_str(),
            message.recipient,
            self.latency.as_millis()
        );
        tokio::time::sleep(self.latency).await;

        let receipt = DeliveryReceipt {
            provider_message_id: format!("sim-{}", Uuid::new_v4()),
            channel: message.channel,
            accepted_at: Utc::now(),
        };
        info!(
            "Delivered {} message {}",
            message.channel.as_str(),
            receipt.provider_message_id
        );
        Ok(receipt)
    }
}

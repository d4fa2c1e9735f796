//! Bus message envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::notification::NotificationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Command,
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub message_id: Uuid,
    pub message_type: MessageType,
    pub message_name: String,
    pub created_at: DateTime<Utc>,
}

/// An immutable envelope: header plus an opaque JSON body.
///
/// Fields are private; a message is fully built by its factory and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    header: MessageHeader,
    body: serde_json::Value,
}

impl Message {
    pub fn new(header: MessageHeader, body: serde_json::Value) -> Self {
        Self { header, body }
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }

    pub fn name(&self) -> &str {
        &self.header.message_name
    }

    /// The `notification_id` carried in the body, if any.
    pub fn notification_id(&self) -> Option<NotificationId> {
        self.body
            .get("notification_id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(NotificationId)
    }
}

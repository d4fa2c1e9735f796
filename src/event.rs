//! Event factory.
//!
//! Builds the events the broker announces on the message bus. The body is a
//! snapshot taken at build time, so later changes to the notification never
//! reach an event that already exists.

use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;
use crate::model::message::{Message, MessageHeader, MessageType};
use crate::model::notification::Notification;

pub const NOTIFICATION_CREATED: &str = "second_life_notification_created";
pub const NOTIFICATION_UPDATED: &str = "second_life_notification_updated";

/// Event announcing that a notification was persisted.
pub fn notification_created(notification: &Notification) -> Result<Message> {
    build_event(NOTIFICATION_CREATED, notification)
}

/// Event announcing a persisted status change.
pub fn notification_updated(notification: &Notification) -> Result<Message> {
    build_event(NOTIFICATION_UPDATED, notification)
}

fn build_event(name: &str, notification: &Notification) -> Result<Message> {
    Ok(Message::new(
        MessageHeader {
            message_id: Uuid::new_v4(),
            message_type: MessageType::Event,
            message_name: name.to_string(),
            created_at: Utc::now(),
        },
        notification.snapshot().to_value()?,
    ))
}

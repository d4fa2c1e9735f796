//! Notification entity and its status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{format_timestamp, now, parse_timestamp};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Newtype for notification IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The Second Life user a notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(rename = "second_life_username")]
    pub username: String,
    #[serde(rename = "second_life_uuid")]
    pub uuid: Uuid,
}

impl Recipient {
    pub fn new(username: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            username: username.into(),
            uuid,
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Created, not yet picked up for delivery.
    Pending,
    /// Delivery is being attempted.
    InProgress,
    /// A worker accepted it. Terminal.
    Success,
    /// Every worker refused it. Terminal.
    Failed,
}

impl NotificationStatus {
    /// Can transition from self to `to`?
    pub fn can_transition_to(self, to: NotificationStatus) -> bool {
        use NotificationStatus::*;
        matches!(
            (self, to),
            (Pending, InProgress) | (InProgress, Success) | (InProgress, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, NotificationStatus::Success | NotificationStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::InProgress => "in_progress",
            NotificationStatus::Success => "success",
            NotificationStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NotificationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(NotificationStatus::Pending),
            "in_progress" => Ok(NotificationStatus::InProgress),
            "success" => Ok(NotificationStatus::Success),
            "failed" => Ok(NotificationStatus::Failed),
            other => Err(Error::InvalidSnapshot(format!(
                "unknown notification status: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// One message owed to one recipient.
///
/// Two notifications are equal when their ids are equal, whatever the rest
/// of their state. Status only changes through the `mark_*` methods.
#[derive(Debug, Clone)]
pub struct Notification {
    id: NotificationId,
    recipient: Recipient,
    message: String,
    status: NotificationStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Notification {
    /// A fresh, pending notification.
    pub fn new(recipient: Recipient, message: impl Into<String>) -> Self {
        let created_at = now();
        Self {
            id: NotificationId::new(),
            recipient,
            message: message.into(),
            status: NotificationStatus::Pending,
            created_at,
            updated_at: created_at,
        }
    }

    /// Rebuild a notification from stored state. For persistence adapters.
    pub fn restore(
        id: NotificationId,
        recipient: Recipient,
        message: impl Into<String>,
        status: NotificationStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            recipient,
            message: message.into(),
            status,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> NotificationId {
        self.id
    }

    pub fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> NotificationStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == NotificationStatus::Pending
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == NotificationStatus::InProgress
    }

    pub fn is_successful(&self) -> bool {
        self.status == NotificationStatus::Success
    }

    /// Pending → InProgress.
    pub fn mark_in_progress(&mut self) -> Result<()> {
        self.transition(NotificationStatus::InProgress)
    }

    /// InProgress → Success.
    pub fn mark_success(&mut self) -> Result<()> {
        self.transition(NotificationStatus::Success)
    }

    /// InProgress → Failed.
    pub fn mark_failed(&mut self) -> Result<()> {
        self.transition(NotificationStatus::Failed)
    }

    fn transition(&mut self, to: NotificationStatus) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(Error::InvalidStatusTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = now();
        Ok(())
    }

    /// Structured snapshot of the current state.
    pub fn snapshot(&self) -> NotificationSnapshot {
        NotificationSnapshot {
            send_to: self.recipient.clone(),
            message: self.message.clone(),
            status: Some(self.status),
            notification_id: Some(self.id),
            created_at: Some(format_timestamp(&self.created_at)),
            updated_at: Some(format_timestamp(&self.updated_at)),
        }
    }

    /// Inverse of [`Notification::snapshot`].
    ///
    /// Missing optional fields fall back to a pending status, a fresh id and
    /// the current time.
    pub fn from_snapshot(snapshot: NotificationSnapshot) -> Result<Self> {
        let created_at = match snapshot.created_at.as_deref() {
            Some(s) => parse_timestamp(s)?,
            None => now(),
        };
        let updated_at = match snapshot.updated_at.as_deref() {
            Some(s) => parse_timestamp(s)?,
            None => created_at,
        };
        Ok(Self {
            id: snapshot.notification_id.unwrap_or_default(),
            recipient: snapshot.send_to,
            message: snapshot.message,
            status: snapshot.status.unwrap_or(NotificationStatus::Pending),
            created_at,
            updated_at,
        })
    }
}

impl PartialEq for Notification {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Notification {}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to {} ({})",
            self.id, self.recipient.username, self.status
        )
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Field-named representation of a notification, used for persistence
/// round-trips and event bodies. Field names are part of the stored format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSnapshot {
    #[serde(alias = "recipient")]
    pub send_to: Recipient,
    pub message: String,
    #[serde(default)]
    pub status: Option<NotificationStatus>,
    #[serde(default, alias = "id")]
    pub notification_id: Option<NotificationId>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl NotificationSnapshot {
    /// JSON form of the snapshot, as carried in message bodies.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }
}

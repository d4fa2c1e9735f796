//! Notification persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::notification::{Notification, NotificationId, NotificationStatus, Recipient};
use crate::ports::NotificationRepository;

const SELECT_COLUMNS: &str =
    "SELECT id, recipient_username, recipient_uuid, message, status, created_at, updated_at
     FROM notifications";

#[async_trait]
impl NotificationRepository for super::Db {
    async fn insert(&self, notification: &Notification) -> Result<()> {
        sqlx::query(
            "INSERT INTO notifications (id, recipient_username, recipient_uuid, message, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(notification.id().0)
        .bind(&notification.recipient().username)
        .bind(notification.recipient().uuid)
        .bind(notification.message())
        .bind(notification.status().as_str())
        .bind(notification.created_at())
        .bind(notification.updated_at())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Persist status and `updated_at`. Everything else is immutable.
    async fn update(&self, notification: &Notification) -> Result<()> {
        let rows_affected = sqlx::query(
            "UPDATE notifications SET status = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(notification.status().as_str())
        .bind(notification.updated_at())
        .bind(notification.id().0)
        .execute(self.pool())
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(Error::NotFound(format!("notification {}", notification.id())));
        }
        Ok(())
    }
}

impl super::Db {
    /// Get a notification by ID.
    pub async fn get_notification(&self, id: NotificationId) -> Result<Notification> {
        let row: Option<NotificationRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1"))
                .bind(id.0)
                .fetch_optional(self.pool())
                .await?;

        row.ok_or_else(|| Error::NotFound(format!("notification {id}")))?
            .try_into_notification()
    }

    /// Most recent notifications first, optionally filtered by status.
    pub async fn list_notifications(
        &self,
        status: Option<NotificationStatus>,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE ($1::text IS NULL OR status = $1)
             ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(status.map(NotificationStatus::as_str))
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter()
            .map(NotificationRow::try_into_notification)
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient_username: String,
    recipient_uuid: Uuid,
    message: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NotificationRow {
    fn try_into_notification(self) -> Result<Notification> {
        Ok(Notification::restore(
            NotificationId(self.id),
            Recipient::new(self.recipient_username, self.recipient_uuid),
            self.message,
            self.status.parse()?,
            self.created_at,
            self.updated_at,
        ))
    }
}

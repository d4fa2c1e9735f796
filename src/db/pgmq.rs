//! pgmq queue operations via direct SQLx, and the bus built on them.
//!
//! Calls pgmq's SQL functions: pgmq.create, pgmq.send, pgmq.read,
//! pgmq.archive.

use std::sync::Arc;

use async_trait::async_trait;
use opentelemetry::KeyValue;

use crate::error::Result;
use crate::model::message::Message;
use crate::ports::MessageBus;
use crate::telemetry::metrics;

/// Postgres NOTIFY channel fired whenever a message is published.
pub const EVENTS_CHANNEL: &str = "notification_events";

/// A message read from a pgmq queue.
#[derive(Debug, Clone)]
pub struct PgmqMessage {
    pub msg_id: i64,
    pub read_ct: i32,
    pub enqueued_at: chrono::DateTime<chrono::Utc>,
    pub vt: chrono::DateTime<chrono::Utc>,
    pub message: serde_json::Value,
}

fn count_operation(queue_name: &str, operation: &'static str) {
    metrics::queue_operations().add(
        1,
        &[
            KeyValue::new("queue", queue_name.to_string()),
            KeyValue::new("operation", operation),
        ],
    );
}

impl super::Db {
    /// Create a pgmq queue (idempotent).
    pub async fn create_queue(&self, queue_name: &str) -> Result<()> {
        sqlx::query("SELECT pgmq.create($1)")
            .bind(queue_name)
            .execute(self.pool())
            .await?;
        count_operation(queue_name, "create");
        Ok(())
    }

    /// Send a message to a pgmq queue. Returns the message ID.
    pub async fn send_to_queue(&self, queue_name: &str, payload: &serde_json::Value) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT pgmq.send($1, $2, 0)")
            .bind(queue_name)
            .bind(payload)
            .fetch_one(self.pool())
            .await?;
        count_operation(queue_name, "send");
        Ok(row.0)
    }

    /// Read the next message from a queue (visibility timeout in seconds).
    /// Returns None if the queue is empty.
    pub async fn read_from_queue(
        &self,
        queue_name: &str,
        vt_seconds: i32,
    ) -> Result<Option<PgmqMessage>> {
        let row = sqlx::query_as::<
            _,
            (
                i64,
                i32,
                chrono::DateTime<chrono::Utc>,
                chrono::DateTime<chrono::Utc>,
                serde_json::Value,
            ),
        >("SELECT msg_id, read_ct, enqueued_at, vt, message FROM pgmq.read($1, $2, 1)")
        .bind(queue_name)
        .bind(vt_seconds)
        .fetch_optional(self.pool())
        .await?;

        let msg = row.map(|(msg_id, read_ct, enqueued_at, vt, message)| PgmqMessage {
            msg_id,
            read_ct,
            enqueued_at,
            vt,
            message,
        });
        count_operation(queue_name, if msg.is_some() { "read" } else { "read_empty" });

        Ok(msg)
    }

    /// Archive a message (moves to the archive table, kept for audit).
    pub async fn archive_message(&self, queue_name: &str, msg_id: i64) -> Result<()> {
        sqlx::query("SELECT pgmq.archive($1, $2)")
            .bind(queue_name)
            .bind(msg_id)
            .execute(self.pool())
            .await?;
        count_operation(queue_name, "archive");
        Ok(())
    }
}

/// [`MessageBus`] backed by a pgmq queue.
///
/// Each publish enqueues the JSON envelope and fires a NOTIFY on
/// [`EVENTS_CHANNEL`] carrying the message name.
pub struct PgmqBus {
    db: Arc<super::Db>,
    queue: String,
}

impl PgmqBus {
    pub fn new(db: Arc<super::Db>, queue: impl Into<String>) -> Self {
        Self {
            db,
            queue: queue.into(),
        }
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }
}

#[async_trait]
impl MessageBus for PgmqBus {
    async fn publish(&self, message: &Message) -> Result<()> {
        let payload = serde_json::to_value(message)?;
        let msg_id = self.db.send_to_queue(&self.queue, &payload).await?;

        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(EVENTS_CHANNEL)
            .bind(message.name())
            .execute(self.db.pool())
            .await?;

        metrics::messages_published().add(1, &[KeyValue::new("name", message.name().to_string())]);
        tracing::debug!(
            queue = %self.queue,
            msg_id,
            name = message.name(),
            "message published"
        );
        Ok(())
    }
}

//! Dispatcher: consumes creation events from the bus queue and runs the
//! process workflow for each announced notification.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use super::process::ProcessNotification;
use crate::db::Db;
use crate::db::pgmq::{EVENTS_CHANNEL, PgmqMessage};
use crate::error::{Error, Result};
use crate::event::NOTIFICATION_CREATED;
use crate::model::message::Message;
use crate::model::notification::{Notification, NotificationId};

/// Configuration for the dispatcher loop.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Queue the creation events are published to.
    pub queue: String,
    /// Visibility timeout (seconds) for pgmq reads.
    pub visibility_timeout: i32,
    /// Poll interval fallback when no NOTIFY arrives.
    pub poll_interval: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue: crate::config::DEFAULT_QUEUE.to_string(),
            visibility_timeout: 60,
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// What became of one queue message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handled {
    /// Processed or not processable; archive it.
    Done,
    /// Leave it; the visibility timeout hands it out again.
    Retry,
}

#[derive(Clone)]
pub struct Dispatcher {
    db: Arc<Db>,
    process: Arc<ProcessNotification>,
    config: DispatcherConfig,
    shutdown: Arc<Notify>,
}

impl Dispatcher {
    pub fn new(db: Arc<Db>, process: Arc<ProcessNotification>, config: DispatcherConfig) -> Self {
        Self {
            db,
            process,
            config,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Signal the loop to stop after the current message.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Run until shutdown.
    pub async fn run(&self) -> Result<()> {
        let mut listener = sqlx::postgres::PgListener::connect_with(self.db.pool()).await?;
        listener.listen(EVENTS_CHANNEL).await?;

        info!(queue = %self.config.queue, "dispatcher started");

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("dispatcher shutting down");
                    return Ok(());
                }
                notif = listener.recv() => {
                    match notif {
                        Ok(n) => debug!(name = n.payload(), "notified of new message"),
                        Err(e) => warn!("PgListener error: {e}, falling back to poll"),
                    }
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }

            // drain everything visible before waiting again
            loop {
                match self.dispatch_next().await {
                    Ok(true) => continue,
                    Ok(false) => break,
                    Err(e) => {
                        error!("dispatch error: {e}");
                        break;
                    }
                }
            }
        }
    }

    /// Read and handle one message. Returns false when the queue is empty.
    pub async fn dispatch_next(&self) -> Result<bool> {
        let Some(msg) = self
            .db
            .read_from_queue(&self.config.queue, self.config.visibility_timeout)
            .await?
        else {
            return Ok(false);
        };

        if self.handle(&msg).await? == Handled::Done {
            self.db.archive_message(&self.config.queue, msg.msg_id).await?;
        }
        Ok(true)
    }

    async fn handle(&self, msg: &PgmqMessage) -> Result<Handled> {
        let Some(id) = announced_notification(msg) else {
            return Ok(Handled::Done);
        };

        // Stored state wins over the event body, which may be stale.
        let notification = match self.db.get_notification(id).await {
            Ok(n) => n,
            Err(Error::NotFound(_)) => {
                warn!(notification_id = %id, "announced notification does not exist");
                return Ok(Handled::Done);
            }
            Err(e) => return Err(e),
        };

        Ok(settle(id, self.process.execute(&notification).await))
    }
}

/// The notification a queue message asks to dispatch. `None` for anything
/// that is not a readable creation event.
fn announced_notification(msg: &PgmqMessage) -> Option<NotificationId> {
    let message: Message = match serde_json::from_value(msg.message.clone()) {
        Ok(m) => m,
        Err(e) => {
            warn!(msg_id = msg.msg_id, "unreadable message, archiving: {e}");
            return None;
        }
    };

    if message.name() != NOTIFICATION_CREATED {
        return None;
    }

    let id = message.notification_id();
    if id.is_none() {
        warn!(msg_id = msg.msg_id, "creation event without notification_id");
    }
    id
}

/// Archive or retry, given the outcome of the process workflow.
///
/// Redelivery only helps when nothing was persisted. Once the notification is
/// in progress a second run is rejected, so a stuck notification is archived
/// and reported for reconciliation.
fn settle(id: NotificationId, outcome: Result<Notification>) -> Handled {
    match outcome {
        Ok(settled) => {
            info!(notification_id = %id, status = %settled.status(), "notification settled");
            Handled::Done
        }
        Err(Error::InvalidStatusTransition { from, .. }) if from.is_terminal() => {
            debug!(notification_id = %id, status = %from, "already processed, skipping");
            Handled::Done
        }
        Err(Error::InvalidStatusTransition { from, .. }) => {
            error!(
                notification_id = %id,
                status = %from,
                "notification stuck in progress, needs reconciliation"
            );
            Handled::Done
        }
        Err(Error::NoWorkersAvailable) => {
            warn!(notification_id = %id, "no workers available, left in progress");
            Handled::Done
        }
        Err(e) => {
            error!(notification_id = %id, "processing aborted: {e}");
            Handled::Retry
        }
    }
}

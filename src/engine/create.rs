//! Create-notification workflow: persist, then announce.

use std::sync::Arc;

use opentelemetry::KeyValue;
use tracing::info;

use crate::error::Result;
use crate::event;
use crate::model::notification::Notification;
use crate::ports::{MessageBus, NotificationRepository};
use crate::telemetry::metrics;

pub struct CreateNotification {
    notifications: Arc<dyn NotificationRepository>,
    bus: Arc<dyn MessageBus>,
}

impl CreateNotification {
    pub fn new(notifications: Arc<dyn NotificationRepository>, bus: Arc<dyn MessageBus>) -> Self {
        Self { notifications, bus }
    }

    /// Insert the notification, then publish its creation event.
    ///
    /// An insert failure aborts before anything is published. A publish
    /// failure is returned as-is; the inserted record is kept.
    pub async fn execute(&self, notification: &Notification) -> Result<()> {
        self.notifications.insert(notification).await?;

        let event = event::notification_created(notification)?;
        self.bus.publish(&event).await?;

        metrics::notifications_created().add(1, &[KeyValue::new("result", "ok")]);
        info!(
            notification_id = %notification.id(),
            message_id = %event.header().message_id,
            "notification created"
        );
        Ok(())
    }
}

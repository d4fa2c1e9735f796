//! Process-notification workflow: dispatch with worker failover.

use std::sync::Arc;

use opentelemetry::KeyValue;
use tracing::{Instrument, Span, debug, error, info};

use crate::error::{Error, Result};
use crate::event;
use crate::model::notification::{Notification, NotificationStatus};
use crate::model::worker::Worker;
use crate::ports::{MessageBus, NotificationRepository, WorkerInterface, WorkerRepository};
use crate::telemetry::dispatch::{
    record_accepting_worker, record_status_transition, start_dispatch_span,
};
use crate::telemetry::metrics;

pub struct ProcessNotification {
    workers: Arc<dyn WorkerRepository>,
    interface: Arc<dyn WorkerInterface>,
    notifications: Arc<dyn NotificationRepository>,
    /// When set, every persisted status change is also announced.
    updates_bus: Option<Arc<dyn MessageBus>>,
}

impl ProcessNotification {
    pub fn new(
        workers: Arc<dyn WorkerRepository>,
        interface: Arc<dyn WorkerInterface>,
        notifications: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            workers,
            interface,
            notifications,
            updates_bus: None,
        }
    }

    /// Publish a `notification updated` event after each status update.
    pub fn with_message_bus(mut self, bus: Arc<dyn MessageBus>) -> Self {
        self.updates_bus = Some(bus);
        self
    }

    /// Dispatch a pending notification to the first worker that accepts it.
    ///
    /// The caller's notification is never modified; the returned value is the
    /// settled copy that was persisted. Errors:
    ///
    /// - [`Error::InvalidStatusTransition`] if the notification is not
    ///   pending. Nothing is persisted.
    /// - [`Error::NoWorkersAvailable`] if the repository has no workers. The
    ///   notification stays in progress.
    /// - any non-communication error from a collaborator, unchanged. The
    ///   notification stays in whatever status was last persisted.
    pub async fn execute(&self, notification: &Notification) -> Result<Notification> {
        if !notification.is_pending() {
            return Err(Error::InvalidStatusTransition {
                id: notification.id(),
                from: notification.status(),
                to: NotificationStatus::InProgress,
            });
        }

        let span = start_dispatch_span(notification.id());
        self.dispatch(notification.clone(), &span)
            .instrument(span.clone())
            .await
    }

    async fn dispatch(&self, mut notification: Notification, span: &Span) -> Result<Notification> {
        notification.mark_in_progress()?;
        record_status_transition(span, NotificationStatus::Pending, notification.status());
        self.update(&notification).await?;

        let workers = self.all_workers().await?;
        for worker in &workers {
            match self.interface.deliver(worker, &notification).await {
                Ok(()) => {
                    metrics::delivery_attempts().add(1, &[KeyValue::new("result", "ok")]);
                    notification.mark_success()?;
                    record_status_transition(
                        span,
                        NotificationStatus::InProgress,
                        notification.status(),
                    );
                    record_accepting_worker(span, worker.id());
                    self.update(&notification).await?;
                    info!(
                        notification_id = %notification.id(),
                        worker_id = %worker.id(),
                        "notification delivered"
                    );
                    return Ok(notification);
                }
                Err(Error::WorkerCommunication(reason)) => {
                    metrics::delivery_attempts().add(1, &[KeyValue::new("result", "refused")]);
                    debug!(
                        notification_id = %notification.id(),
                        worker_id = %worker.id(),
                        %reason,
                        "worker refused notification, trying next"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        notification.mark_failed()?;
        record_status_transition(span, NotificationStatus::InProgress, notification.status());
        self.update(&notification).await?;
        error!(
            notification_id = %notification.id(),
            workers = workers.len(),
            "failed to process notification, every worker refused it"
        );
        Ok(notification)
    }

    async fn all_workers(&self) -> Result<Vec<Worker>> {
        let workers = self.workers.get_all().await?;
        if workers.is_empty() {
            return Err(Error::NoWorkersAvailable);
        }
        Ok(workers)
    }

    async fn update(&self, notification: &Notification) -> Result<()> {
        self.notifications.update(notification).await?;
        if let Some(ref bus) = self.updates_bus {
            bus.publish(&event::notification_updated(notification)?).await?;
        }
        Ok(())
    }
}

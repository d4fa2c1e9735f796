//! Collaborator interfaces the broker workflows depend on.
//!
//! Postgres, pgmq and HTTP implementations live in [`crate::db`] and
//! [`crate::transport`]; tests plug in their own.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::message::Message;
use crate::model::notification::Notification;
use crate::model::worker::Worker;

/// Notification persistence.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> Result<()>;
    async fn update(&self, notification: &Notification) -> Result<()>;
}

/// Source of dispatch targets. The order returned is the order tried.
#[async_trait]
pub trait WorkerRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Worker>>;
}

/// Delivery to a single worker.
///
/// Implementations report an unreachable or refusing worker as
/// [`Error::WorkerCommunication`](crate::error::Error::WorkerCommunication);
/// any other error aborts dispatch.
#[async_trait]
pub trait WorkerInterface: Send + Sync {
    async fn deliver(&self, worker: &Worker, notification: &Notification) -> Result<()>;
}

#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(&self, message: &Message) -> Result<()>;
}

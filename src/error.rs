//! Error types for sl-broker.

use thiserror::Error;

use crate::model::notification::{NotificationId, NotificationStatus};

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid status transition for notification {id}: {from} -> {to}")]
    InvalidStatusTransition {
        id: NotificationId,
        from: NotificationStatus,
        to: NotificationStatus,
    },

    #[error("no workers available")]
    NoWorkersAvailable,

    /// A single worker could not be reached or refused the notification.
    /// Recoverable by trying the next worker.
    #[error("worker communication failure: {0}")]
    WorkerCommunication(String),

    #[error("invalid worker address: {0}")]
    InvalidWorkerAddress(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

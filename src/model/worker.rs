//! Worker entity: a delivery endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{format_timestamp, now};
use crate::error::{Error, Result};

/// Newtype for worker IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub Uuid);

impl WorkerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reachability as last reported. Dispatch does not look at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Online,
    Offline,
}

impl WorkerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkerStatus::Online => "online",
            WorkerStatus::Offline => "offline",
        }
    }
}

impl std::fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WorkerStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "online" => Ok(WorkerStatus::Online),
            "offline" => Ok(WorkerStatus::Offline),
            other => Err(Error::InvalidSnapshot(format!(
                "unknown worker status: {other}"
            ))),
        }
    }
}

/// A delivery endpoint, addressed by URL.
#[derive(Debug, Clone)]
pub struct Worker {
    id: WorkerId,
    status: WorkerStatus,
    address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Worker {
    pub fn new(id: WorkerId, status: WorkerStatus, address: impl Into<String>) -> Self {
        let created_at = now();
        Self {
            id,
            status,
            address: address.into(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Rebuild a worker from stored state.
    pub fn restore(
        id: WorkerId,
        status: WorkerStatus,
        address: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            status,
            address: address.into(),
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn status(&self) -> WorkerStatus {
        self.status
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Refresh the liveness timestamp.
    pub fn heartbeat(&mut self) {
        self.updated_at = now();
    }

    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "worker_uuid": self.id.0,
            "worker_status": self.status.as_str(),
            "worker_url": self.address,
            "created_at": format_timestamp(&self.created_at),
            "updated_at": format_timestamp(&self.updated_at),
        })
    }
}

impl std::fmt::Display for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {} ({})", self.id, self.address, self.status)
    }
}

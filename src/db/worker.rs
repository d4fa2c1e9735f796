//! Worker registry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::worker::{Worker, WorkerId, WorkerStatus};
use crate::ports::WorkerRepository;
use crate::transport::parse_worker_address;

#[async_trait]
impl WorkerRepository for super::Db {
    /// Every registered worker, oldest registration first.
    async fn get_all(&self) -> Result<Vec<Worker>> {
        let rows: Vec<WorkerRow> = sqlx::query_as(
            "SELECT id, status, url, created_at, updated_at FROM workers
             ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(WorkerRow::try_into_worker).collect()
    }
}

impl super::Db {
    /// Register a new online worker at `url`.
    ///
    /// The URL is validated first; a malformed address is never stored.
    pub async fn register_worker(&self, url: &str) -> Result<Worker> {
        parse_worker_address(url)?;
        let worker = Worker::new(WorkerId::new(), WorkerStatus::Online, url);
        sqlx::query(
            "INSERT INTO workers (id, status, url, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(worker.id().0)
        .bind(worker.status().as_str())
        .bind(worker.address())
        .bind(worker.created_at())
        .bind(worker.updated_at())
        .execute(self.pool())
        .await?;
        Ok(worker)
    }

    pub async fn get_worker(&self, id: WorkerId) -> Result<Worker> {
        let row: Option<WorkerRow> = sqlx::query_as(
            "SELECT id, status, url, created_at, updated_at FROM workers WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(self.pool())
        .await?;

        row.ok_or_else(|| Error::NotFound(format!("worker {id}")))?
            .try_into_worker()
    }

    /// Refresh a worker's liveness timestamp.
    pub async fn heartbeat_worker(&self, id: WorkerId) -> Result<Worker> {
        let mut worker = self.get_worker(id).await?;
        worker.heartbeat();
        sqlx::query("UPDATE workers SET updated_at = $1 WHERE id = $2")
            .bind(worker.updated_at())
            .bind(id.0)
            .execute(self.pool())
            .await?;
        Ok(worker)
    }

    pub async fn set_worker_status(&self, id: WorkerId, status: WorkerStatus) -> Result<Worker> {
        let rows_affected =
            sqlx::query("UPDATE workers SET status = $1, updated_at = now() WHERE id = $2")
                .bind(status.as_str())
                .bind(id.0)
                .execute(self.pool())
                .await?
                .rows_affected();

        if rows_affected == 0 {
            return Err(Error::NotFound(format!("worker {id}")));
        }
        self.get_worker(id).await
    }
}

#[derive(sqlx::FromRow)]
struct WorkerRow {
    id: Uuid,
    status: String,
    url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WorkerRow {
    fn try_into_worker(self) -> Result<Worker> {
        Ok(Worker::restore(
            WorkerId(self.id),
            self.status.parse()?,
            self.url,
            self.created_at,
            self.updated_at,
        ))
    }
}

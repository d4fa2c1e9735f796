//! HTTP delivery to workers.
//!
//! A worker accepts a notification by answering 2xx to a POST of its
//! snapshot. Anything that keeps the request from getting a 2xx answer is a
//! communication failure, so dispatch moves on to the next worker.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::model::notification::Notification;
use crate::model::worker::Worker;
use crate::ports::WorkerInterface;

pub struct HttpWorkerInterface {
    client: reqwest::Client,
}

impl HttpWorkerInterface {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WorkerInterface for HttpWorkerInterface {
    async fn deliver(&self, worker: &Worker, notification: &Notification) -> Result<()> {
        let response = self
            .client
            .post(worker.address())
            .json(&notification.snapshot())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::WorkerCommunication(format!(
                "worker {} answered {status}",
                worker.id()
            )));
        }
        Ok(())
    }
}

/// Check that `address` is an absolute http(s) URL the transport can post to.
pub fn parse_worker_address(address: &str) -> Result<reqwest::Url> {
    let url = reqwest::Url::parse(address)
        .map_err(|e| Error::InvalidWorkerAddress(format!("{address:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
        return Err(Error::InvalidWorkerAddress(format!(
            "{address:?}: expected an http or https URL"
        )));
    }
    Ok(url)
}

/// Builder errors (e.g. an unparsable worker URL) are not the worker's
/// fault and abort dispatch; everything else is a failed attempt.
fn classify(e: reqwest::Error) -> Error {
    if e.is_builder() {
        Error::Http(e)
    } else {
        Error::WorkerCommunication(e.to_string())
    }
}

//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing or
//! malformed. The database URL is wrapped in `SecretString` so it never
//! shows up in logs or `Debug` output.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::{Error, Result};

pub const DEFAULT_QUEUE: &str = "notifications";

#[derive(Debug)]
pub struct Config {
    pub database_url: SecretString,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
    /// pgmq queue carrying notification events.
    pub queue: String,
    /// Bound on a single worker delivery request.
    pub worker_timeout: Duration,
    /// Dispatcher poll fallback when no NOTIFY arrives.
    pub poll_interval: Duration,
    /// Visibility timeout (seconds) for pgmq reads.
    pub visibility_timeout: i32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: SecretString::from(required_var("DATABASE_URL")?),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            queue: std::env::var("BROKER_QUEUE").unwrap_or_else(|_| DEFAULT_QUEUE.to_string()),
            worker_timeout: Duration::from_secs(parsed_var("WORKER_TIMEOUT_SECS", 10)?),
            poll_interval: Duration::from_millis(parsed_var("DISPATCH_POLL_MS", 5000)?),
            visibility_timeout: parsed_var("DISPATCH_VISIBILITY_SECS", 60)?,
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}

fn parsed_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("{name}={raw:?} is invalid: {e}"))),
        Err(_) => Ok(default),
    }
}

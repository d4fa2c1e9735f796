//! Core data model.
//!
//! A notification is a message owed to one Second Life user. A worker is an
//! endpoint that can attempt delivery. Messages are the envelopes announced
//! on the bus.

pub mod message;
pub mod notification;
pub mod worker;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

use crate::error::{Error, Result};

/// Canonical timestamp rendering used in snapshots. Always UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Current time, truncated to the microsecond precision snapshots and
/// Postgres can represent.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    // %.f also accepts a missing fraction ("2024-01-01 10:00:00")
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::InvalidSnapshot(format!("bad timestamp {s:?}: {e}")))
}

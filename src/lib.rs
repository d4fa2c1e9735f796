//! # sl-broker
//!
//! Notification broker for Second Life users. A notification is persisted,
//! announced on a message bus, then dispatched to the first worker that
//! accepts it, failing over through the registered workers in order.
//!
//! The workflows in [`engine`] only talk to the traits in [`ports`];
//! [`db`] (Postgres + pgmq) and [`transport`] (HTTP) are the adapters the
//! `sl-broker` binary wires in.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod event;
pub mod model;
pub mod ports;
pub mod telemetry;
pub mod transport;

//! Metric instrument factories for sl-broker.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without a provider the instruments are no-ops.

use opentelemetry::metrics::{Counter, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("sl-broker")
}

/// Counter: notifications persisted and announced.
pub fn notifications_created() -> Counter<u64> {
    meter()
        .u64_counter("broker.notifications.created")
        .with_description("Number of notifications created")
        .build()
}

/// Counter: notification status transitions.
/// Labels: `from`, `to`.
pub fn status_transitions() -> Counter<u64> {
    meter()
        .u64_counter("broker.notifications.status_transitions")
        .with_description("Number of notification status transitions")
        .build()
}

/// Counter: delivery attempts against single workers.
/// Labels: `result` ("ok" | "refused").
pub fn delivery_attempts() -> Counter<u64> {
    meter()
        .u64_counter("broker.delivery.attempts")
        .with_description("Number of worker delivery attempts")
        .build()
}

/// Counter: messages published on the bus.
/// Labels: `name`.
pub fn messages_published() -> Counter<u64> {
    meter()
        .u64_counter("broker.bus.published")
        .with_description("Number of messages published")
        .build()
}

/// Counter: queue-level operations (send, read, archive).
/// Labels: `queue`, `operation`.
pub fn queue_operations() -> Counter<u64> {
    meter()
        .u64_counter("broker.queue.operations")
        .with_description("Number of queue operations")
        .build()
}

//! Dispatch span helpers.

use tracing::Span;

use crate::model::notification::{NotificationId, NotificationStatus};
use crate::model::worker::WorkerId;

/// Start a span covering one run of the dispatch workflow.
pub fn start_dispatch_span(notification_id: NotificationId) -> Span {
    tracing::info_span!(
        "notification.dispatch",
        "notification.id" = %notification_id,
        "notification.status" = tracing::field::Empty,
        "worker.id" = tracing::field::Empty,
    )
}

/// Record a status transition on the span and in the transition counter.
pub fn record_status_transition(span: &Span, from: NotificationStatus, to: NotificationStatus) {
    span.record("notification.status", to.as_str());
    span.in_scope(|| {
        tracing::info!(from = %from, to = %to, "status_transition");
    });
    super::metrics::status_transitions().add(
        1,
        &[
            opentelemetry::KeyValue::new("from", from.as_str()),
            opentelemetry::KeyValue::new("to", to.as_str()),
        ],
    );
}

/// Mark the worker that accepted the notification.
pub fn record_accepting_worker(span: &Span, worker_id: WorkerId) {
    span.record("worker.id", tracing::field::display(worker_id));
}

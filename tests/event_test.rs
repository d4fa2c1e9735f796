//! Event factory.

mod common;

use sl_broker::event::{self, NOTIFICATION_CREATED, NOTIFICATION_UPDATED};
use sl_broker::model::message::{Message, MessageType};

use common::pending_notification;

#[test]
fn created_event_carries_snapshot() {
    let n = pending_notification();

    let event = event::notification_created(&n).unwrap();

    assert_eq!(event.header().message_type, MessageType::Event);
    assert_eq!(event.name(), NOTIFICATION_CREATED);
    assert_eq!(event.body(), &n.snapshot().to_value().unwrap());
    assert_eq!(event.notification_id(), Some(n.id()));
}

#[test]
fn each_event_gets_a_fresh_id() {
    let n = pending_notification();
    let a = event::notification_created(&n).unwrap();
    let b = event::notification_created(&n).unwrap();
    assert_ne!(a.header().message_id, b.header().message_id);
}

#[test]
fn later_changes_do_not_reach_built_event() {
    let mut n = pending_notification();
    let event = event::notification_created(&n).unwrap();

    n.mark_in_progress().unwrap();

    assert_eq!(event.body()["status"], "pending");
    assert_eq!(
        event::notification_updated(&n).unwrap().body()["status"],
        "in_progress"
    );
}

#[test]
fn updated_event_name() {
    let n = pending_notification();
    let event = event::notification_updated(&n).unwrap();
    assert_eq!(event.name(), NOTIFICATION_UPDATED);
}

#[test]
fn envelope_survives_json_transport() {
    let event = event::notification_created(&pending_notification()).unwrap();

    let wire = serde_json::to_value(&event).unwrap();
    assert_eq!(wire["header"]["message_type"], "event");
    assert_eq!(wire["header"]["message_name"], NOTIFICATION_CREATED);

    let back: Message = serde_json::from_value(wire).unwrap();
    assert_eq!(back, event);
}

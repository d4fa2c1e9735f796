use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use sl_broker::error::Error;
use sl_broker::model::worker::{Worker, WorkerId, WorkerStatus};

#[test]
fn snapshot_uses_stored_field_names() {
    let id = WorkerId::new();
    let ts = Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap();
    let worker = Worker::restore(id, WorkerStatus::Online, "https://slworkerurl.com", ts, ts);

    assert_eq!(
        worker.snapshot(),
        json!({
            "worker_uuid": id.0,
            "worker_status": "online",
            "worker_url": "https://slworkerurl.com",
            "created_at": "2024-05-02 08:00:00.000000",
            "updated_at": "2024-05-02 08:00:00.000000",
        })
    );
}

#[test]
fn heartbeat_refreshes_updated_at_only() {
    let ts = Utc::now() - Duration::minutes(5);
    let mut worker = Worker::restore(
        WorkerId::new(),
        WorkerStatus::Offline,
        "https://slworkerurl.com",
        ts,
        ts,
    );

    worker.heartbeat();

    assert!(worker.updated_at() > ts);
    assert_eq!(worker.created_at(), ts);
    assert_eq!(worker.status(), WorkerStatus::Offline);
    assert_ne!(
        worker.snapshot()["updated_at"],
        worker.snapshot()["created_at"]
    );
}

#[test]
fn new_worker_starts_with_equal_timestamps() {
    let worker = Worker::new(WorkerId::new(), WorkerStatus::Online, "https://w1");
    assert_eq!(worker.created_at(), worker.updated_at());
    assert_eq!(worker.address(), "https://w1");
}

#[test]
fn status_parses_from_wire_form() {
    assert_eq!("offline".parse::<WorkerStatus>().unwrap(), WorkerStatus::Offline);
    assert!(matches!(
        "busy".parse::<WorkerStatus>(),
        Err(Error::InvalidSnapshot(_))
    ));
}

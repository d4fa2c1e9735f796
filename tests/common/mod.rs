//! Recording fakes for the broker ports.
//!
//! Every fake appends to a shared journal so tests can assert the exact
//! order of collaborator calls.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sl_broker::error::{Error, Result};
use sl_broker::model::message::Message;
use sl_broker::model::notification::{
    Notification, NotificationId, NotificationStatus, Recipient,
};
use sl_broker::model::worker::{Worker, WorkerId, WorkerStatus};
use sl_broker::ports::{MessageBus, NotificationRepository, WorkerInterface, WorkerRepository};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Insert(NotificationId),
    Update(NotificationId, NotificationStatus),
    GetAllWorkers,
    Deliver(WorkerId),
    Publish(String),
}

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<NotificationStatus> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update(_, status) => Some(status),
                _ => None,
            })
            .collect()
    }

    pub fn deliveries(&self) -> Vec<WorkerId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Deliver(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn recipient() -> Recipient {
    Recipient::new("slusername", Uuid::new_v4())
}

pub fn pending_notification() -> Notification {
    Notification::new(recipient(), "This is a custom message")
}

/// A pending notification whose timestamps lie an hour in the past, so any
/// transition visibly moves `updated_at`.
pub fn aged_notification() -> Notification {
    let created_at = now_micros() - Duration::hours(1);
    Notification::restore(
        NotificationId::new(),
        recipient(),
        "This is a notification message.",
        NotificationStatus::Pending,
        created_at,
        created_at,
    )
}

pub fn online_worker(url: &str) -> Worker {
    Worker::new(WorkerId::new(), WorkerStatus::Online, url)
}

fn now_micros() -> chrono::DateTime<Utc> {
    use chrono::SubsecRound;
    Utc::now().trunc_subsecs(6)
}

// ---------------------------------------------------------------------------
// Notification repository
// ---------------------------------------------------------------------------

pub struct FakeNotifications {
    journal: Journal,
    fail_insert: bool,
    fail_update: bool,
}

impl FakeNotifications {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_insert: false,
            fail_update: false,
        }
    }

    pub fn failing_insert(mut self) -> Self {
        self.fail_insert = true;
        self
    }

    pub fn failing_update(mut self) -> Self {
        self.fail_update = true;
        self
    }
}

#[async_trait]
impl NotificationRepository for FakeNotifications {
    async fn insert(&self, notification: &Notification) -> Result<()> {
        self.journal.push(Call::Insert(notification.id()));
        if self.fail_insert {
            return Err(Error::Other("insert failed".to_string()));
        }
        Ok(())
    }

    async fn update(&self, notification: &Notification) -> Result<()> {
        self.journal
            .push(Call::Update(notification.id(), notification.status()));
        if self.fail_update {
            return Err(Error::Other("update failed".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Worker repository
// ---------------------------------------------------------------------------

pub struct FakeWorkers {
    journal: Journal,
    workers: Vec<Worker>,
    fail: bool,
}

impl FakeWorkers {
    pub fn new(journal: &Journal, workers: Vec<Worker>) -> Self {
        Self {
            journal: journal.clone(),
            workers,
            fail: false,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl WorkerRepository for FakeWorkers {
    async fn get_all(&self) -> Result<Vec<Worker>> {
        self.journal.push(Call::GetAllWorkers);
        if self.fail {
            return Err(Error::Other("worker registry unreachable".to_string()));
        }
        Ok(self.workers.clone())
    }
}

// ---------------------------------------------------------------------------
// Worker interface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Accept,
    Refuse,
    /// A failure that is not a communication failure.
    Crash,
}

pub struct ScriptedInterface {
    journal: Journal,
    replies: HashMap<WorkerId, Reply>,
    default: Reply,
    seen: Mutex<Vec<Notification>>,
}

impl ScriptedInterface {
    pub fn new(journal: &Journal, default: Reply) -> Self {
        Self {
            journal: journal.clone(),
            replies: HashMap::new(),
            default,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(mut self, worker: &Worker, reply: Reply) -> Self {
        self.replies.insert(worker.id(), reply);
        self
    }

    /// Notifications as they were handed to workers.
    pub fn seen(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkerInterface for ScriptedInterface {
    async fn deliver(&self, worker: &Worker, notification: &Notification) -> Result<()> {
        self.journal.push(Call::Deliver(worker.id()));
        self.seen.lock().unwrap().push(notification.clone());
        match self.replies.get(&worker.id()).copied().unwrap_or(self.default) {
            Reply::Accept => Ok(()),
            Reply::Refuse => Err(Error::WorkerCommunication(format!(
                "worker {} unreachable",
                worker.id()
            ))),
            Reply::Crash => Err(Error::Other("transport exploded".to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Message bus
// ---------------------------------------------------------------------------

pub struct FakeBus {
    journal: Journal,
    fail: bool,
    published: Mutex<Vec<Message>>,
}

impl FakeBus {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail: false,
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn published(&self) -> Vec<Message> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageBus for FakeBus {
    async fn publish(&self, message: &Message) -> Result<()> {
        self.journal.push(Call::Publish(message.name().to_string()));
        if self.fail {
            return Err(Error::Other("bus unavailable".to_string()));
        }
        self.published.lock().unwrap().push(message.clone());
        Ok(())
    }
}

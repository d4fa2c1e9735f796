//! sl-broker CLI - operator interface to the notification broker.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use sl_broker::config::Config;
use sl_broker::db::{Db, PgmqBus};
use sl_broker::engine::{CreateNotification, Dispatcher, DispatcherConfig, ProcessNotification};
use sl_broker::model::notification::{Notification, NotificationId, NotificationStatus, Recipient};
use sl_broker::model::worker::{WorkerId, WorkerStatus};
use sl_broker::ports::WorkerRepository;
use sl_broker::telemetry::{TelemetryConfig, init_telemetry};
use sl_broker::transport::HttpWorkerInterface;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "sl-broker", about = "Notification broker for Second Life users")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the dispatcher daemon
    Serve {
        /// Also publish an event on every status change
        #[arg(long)]
        publish_updates: bool,
    },
    /// Notification operations
    Notification {
        #[command(subcommand)]
        action: NotificationAction,
    },
    /// Worker operations
    Worker {
        #[command(subcommand)]
        action: WorkerAction,
    },
}

#[derive(Subcommand)]
enum NotificationAction {
    /// Create a notification and announce it
    Send {
        /// Second Life username
        username: String,
        /// Second Life avatar UUID
        uuid: Uuid,
        /// Message body
        message: String,
    },
    /// List notifications
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<NotificationStatus>,
        /// Maximum notifications to show
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Show a notification
    Show { id: Uuid },
    /// Dispatch a pending notification now, bypassing the queue
    Process { id: Uuid },
}

#[derive(Subcommand)]
enum WorkerAction {
    /// Register a worker endpoint
    Register { url: String },
    /// List workers in dispatch order
    List,
    /// Refresh a worker's liveness timestamp
    Heartbeat { id: Uuid },
    /// Set a worker's reported status
    Status { id: Uuid, status: WorkerStatus },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "sl-broker".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let db = Db::connect(config.database_url.expose_secret()).await?;
    db.migrate().await?;
    db.create_queue(&config.queue).await?;
    let db = Arc::new(db);

    match cli.command {
        Command::Serve { publish_updates } => cmd_serve(db, &config, publish_updates).await,
        Command::Notification { action } => match action {
            NotificationAction::Send {
                username,
                uuid,
                message,
            } => cmd_notification_send(db, &config, username, uuid, message).await,
            NotificationAction::List { status, limit } => {
                cmd_notification_list(&db, status, limit).await
            }
            NotificationAction::Show { id } => cmd_notification_show(&db, id).await,
            NotificationAction::Process { id } => cmd_notification_process(db, &config, id).await,
        },
        Command::Worker { action } => match action {
            WorkerAction::Register { url } => {
                let worker = db.register_worker(&url).await?;
                println!("Registered: {worker}");
                Ok(())
            }
            WorkerAction::List => cmd_worker_list(&db).await,
            WorkerAction::Heartbeat { id } => {
                let worker = db.heartbeat_worker(WorkerId(id)).await?;
                println!("Heartbeat: {} at {}", worker.id(), worker.updated_at());
                Ok(())
            }
            WorkerAction::Status { id, status } => {
                let worker = db.set_worker_status(WorkerId(id), status).await?;
                println!("Updated: {worker}");
                Ok(())
            }
        },
    }
}

fn process_workflow(
    db: Arc<Db>,
    config: &Config,
    publish_updates: bool,
) -> anyhow::Result<ProcessNotification> {
    let interface = Arc::new(HttpWorkerInterface::new(config.worker_timeout)?);
    let process = ProcessNotification::new(db.clone(), interface, db.clone());
    Ok(if publish_updates {
        process.with_message_bus(Arc::new(PgmqBus::new(db, &config.queue)))
    } else {
        process
    })
}

async fn cmd_serve(db: Arc<Db>, config: &Config, publish_updates: bool) -> anyhow::Result<()> {
    let process = process_workflow(db.clone(), config, publish_updates)?;
    let dispatcher = Dispatcher::new(
        db,
        Arc::new(process),
        DispatcherConfig {
            queue: config.queue.clone(),
            visibility_timeout: config.visibility_timeout,
            poll_interval: config.poll_interval,
        },
    );

    let handle = dispatcher.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        handle.shutdown();
    });

    dispatcher.run().await?;
    Ok(())
}

async fn cmd_notification_send(
    db: Arc<Db>,
    config: &Config,
    username: String,
    uuid: Uuid,
    message: String,
) -> anyhow::Result<()> {
    let notification = Notification::new(Recipient::new(username, uuid), message);
    let bus = Arc::new(PgmqBus::new(db.clone(), &config.queue));
    CreateNotification::new(db, bus)
        .execute(&notification)
        .await?;
    println!("Created: {} (status: {})", notification.id(), notification.status());
    Ok(())
}

async fn cmd_notification_list(
    db: &Db,
    status: Option<NotificationStatus>,
    limit: i64,
) -> anyhow::Result<()> {
    let notifications = db.list_notifications(status, limit).await?;

    if notifications.is_empty() {
        println!("No notifications found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<11}  {:<24}  CREATED",
        "ID", "STATUS", "RECIPIENT"
    );
    println!("{}", "-".repeat(96));

    for n in &notifications {
        println!(
            "{:<36}  {:<11}  {:<24}  {}",
            n.id().to_string(),
            n.status().to_string(),
            n.recipient().username,
            n.created_at().format("%Y-%m-%d %H:%M")
        );
    }

    println!("\n{} notification(s)", notifications.len());
    Ok(())
}

async fn cmd_notification_show(db: &Db, id: Uuid) -> anyhow::Result<()> {
    let notification = db.get_notification(NotificationId(id)).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&notification.snapshot())?
    );
    Ok(())
}

async fn cmd_notification_process(db: Arc<Db>, config: &Config, id: Uuid) -> anyhow::Result<()> {
    let notification = db.get_notification(NotificationId(id)).await?;
    let settled = process_workflow(db, config, false)?
        .execute(&notification)
        .await?;
    println!("Processed: {} (status: {})", settled.id(), settled.status());
    Ok(())
}

async fn cmd_worker_list(db: &Db) -> anyhow::Result<()> {
    let workers = db.get_all().await?;

    if workers.is_empty() {
        println!("No workers registered.");
        return Ok(());
    }

    println!("{:<36}  {:<8}  {:<40}  LAST SEEN", "ID", "STATUS", "URL");
    println!("{}", "-".repeat(110));
    for w in &workers {
        println!(
            "{:<36}  {:<8}  {:<40}  {}",
            w.id().to_string(),
            w.status().to_string(),
            w.address(),
            w.updated_at().format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

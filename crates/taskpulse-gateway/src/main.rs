use clap::Parser;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use taskpulse_channels::{NotificationSender, WhatsAppSender};
use taskpulse_core::config::{TaskpulseConfig, WhatsAppConfig};
use taskpulse_scheduler::{ReminderEngine, ReminderSettings};
use tracing::{info, warn};

mod app;
mod http;

/// Task tracker HTTP gateway with WhatsApp deadline reminders.
#[derive(Debug, Parser)]
#[command(name = "taskpulse-gateway", version)]
struct Cli {
    /// Path to taskpulse.toml (falls back to $TASKPULSE_CONFIG, then ./taskpulse.toml).
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "taskpulse_gateway=info,taskpulse_scheduler=info,tower_http=debug".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // explicit flag > TASKPULSE_CONFIG env > ./taskpulse.toml
    let config_path = cli.config.or_else(|| std::env::var("TASKPULSE_CONFIG").ok());
    let config = TaskpulseConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        TaskpulseConfig::default()
    });

    let db_path = config.database.path.clone();
    ensure_parent_dir(&db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = open_db(&db_path)?;
    taskpulse_users::db::init_db(&db)?;
    taskpulse_tasks::db::init_db(&db)?;
    info!("database migrations complete");

    // users and tasks share the API connection; the reminder engine gets its own
    let api_db = Arc::new(Mutex::new(db));
    let auth = taskpulse_users::AuthGate::new(Arc::clone(&api_db));
    let tasks = taskpulse_tasks::TaskRepository::new(api_db);

    let notifier = build_notifier(&config);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let engine_handle = match &notifier {
        Some(sender) => {
            let engine = ReminderEngine::new(
                open_db(&db_path)?,
                Arc::clone(sender),
                ReminderSettings::from(&config.reminders),
            );
            Some(tokio::spawn(engine.run(shutdown_rx)))
        }
        None => {
            warn!("No WhatsApp credentials configured; reminders are disabled");
            None
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    let state = Arc::new(app::AppState::new(config, auth, tasks, notifier));
    let router = app::build_router(state);

    info!("Taskpulse gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // signal the reminder engine to stop and let an in-flight cycle finish
    let _ = shutdown_tx.send(true);
    if let Some(handle) = engine_handle {
        let _ = handle.await;
    }
    Ok(())
}

/// Open a connection with the pragmas every Taskpulse connection needs.
///
/// `foreign_keys` is per connection, and the busy timeout lets the API and the
/// reminder engine write to the same file without `SQLITE_BUSY` failures.
fn open_db(path: &str) -> rusqlite::Result<rusqlite::Connection> {
    let conn = rusqlite::Connection::open(path)?;
    conn.execute_batch(
        "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;",
    )?;
    Ok(conn)
}

/// WhatsApp transport from `[whatsapp]`, else from the `TWILIO_*` variables.
fn build_notifier(config: &TaskpulseConfig) -> Option<Arc<dyn NotificationSender>> {
    let wa = config.whatsapp.clone().or_else(WhatsAppConfig::from_env)?;
    match WhatsAppSender::new(&wa) {
        Ok(sender) => {
            info!(from = %wa.from_number, "WhatsApp sender configured");
            Some(Arc::new(sender))
        }
        Err(e) => {
            warn!("WhatsApp sender disabled: {e}");
            None
        }
    }
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

//! # Brokerbook Reminder Agent
//!
//! Background process that scans the sales snapshot for due, overdue and
//! overpaid invoices and publishes reminders.
//!
//! ## Usage
//! ```text
//! reminder-agent [--config <path>] [--once]
//!
//!   --config <path>   notify.toml to load (default: platform config dir)
//!   --once            scan once, print new notifications as JSON, exit
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load `NotifyConfig` (file, then `BROKERBOOK_*` overrides)
//! 3. Create the notification hub and a logging subscriber
//! 4. Start the reminder agent
//! 5. Wait for Ctrl-C / SIGTERM, then shut the agent down

use std::path::PathBuf;

use brokerbook_notify::{NotificationHub, NotifyConfig, ReminderAgent};
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Payment reminder daemon for Brokerbook.
#[derive(Debug, Parser)]
#[command(name = "reminder-agent", version)]
struct Args {
    /// notify.toml to load (default: platform config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Scan once, print new notifications as JSON, exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = Args::parse();
    let config = NotifyConfig::load(args.config)?;
    info!(
        tenant_id = %config.tenant_id(),
        snapshot = ?config.snapshot_path(),
        "Configuration loaded"
    );

    let hub = NotificationHub::new(&config.hub);
    let agent = ReminderAgent::new(config, hub.clone());

    if args.once {
        let today = chrono::Local::now().date_naive();
        let published = agent.run_once(today).await?;
        println!("{}", serde_json::to_string_pretty(&published)?);
        return Ok(());
    }

    let mut rx = hub.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(n) => info!(
                    kind = %n.kind,
                    recipient = %n.recipient_id,
                    invoice = %n.invoice_number,
                    amount = %n.amount,
                    "{}",
                    n.message
                ),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Notification log fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let handle = agent.start();
    shutdown_signal().await;
    handle.shutdown().await?;

    info!("Reminder agent exited");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=brokerbook_notify=trace` - Include dropped duplicates
/// - Default: INFO, DEBUG for brokerbook crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,brokerbook_notify=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

//! # Reminder Agent
//!
//! Background task that periodically reloads the sales snapshot, scans it
//! and publishes reminders to the hub.
//!
//! ## Agent Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ReminderAgent loop                                │
//! │                                                                         │
//! │   interval.tick() ─┐                                                   │
//! │   ScanNow ─────────┼──▶ SalesSnapshot::load ──▶ ReminderScanner::scan  │
//! │                    │                                  │                 │
//! │                    │                                  ▼                 │
//! │                    │                       NotificationHub::publish     │
//! │                    │                       (duplicates dropped)         │
//! │   Shutdown ────────┴──▶ break                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed pass (missing snapshot, malformed JSON) is logged and the loop
//! carries on with the next tick.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::NotifyConfig;
use crate::error::{NotifyError, NotifyResult};
use crate::hub::NotificationHub;
use crate::notification::Notification;
use crate::reminder::{ReminderScanner, SaleAccount};
use crate::snapshot::SalesSnapshot;

#[derive(Debug)]
enum AgentCommand {
    ScanNow,
    Shutdown,
}

/// Scans sales on an interval and publishes reminders.
pub struct ReminderAgent {
    config: Arc<NotifyConfig>,
    hub: NotificationHub,
    scanner: ReminderScanner,
}

impl ReminderAgent {
    pub fn new(config: NotifyConfig, hub: NotificationHub) -> Self {
        let scanner = ReminderScanner::new(&config);
        ReminderAgent {
            config: Arc::new(config),
            hub,
            scanner,
        }
    }

    /// Scans `accounts` as of `today` and publishes the result.
    /// Returns the notifications the hub accepted, duplicates excluded.
    pub async fn process(&self, accounts: &[SaleAccount], today: NaiveDate) -> Vec<Notification> {
        let report = self.scanner.scan(accounts, today);

        let mut published = Vec::new();
        for notification in report.notifications {
            if self.hub.publish(notification.clone()).await.is_some() {
                published.push(notification);
            }
        }
        published
    }

    /// One load-scan-publish pass against the configured snapshot.
    pub async fn run_once(&self, today: NaiveDate) -> NotifyResult<Vec<Notification>> {
        let path = self
            .config
            .snapshot_path()
            .ok_or_else(|| NotifyError::InvalidConfig("snapshot.path is not set".into()))?;

        let snapshot = SalesSnapshot::load(path)?;
        let published = self.process(&snapshot.accounts, today).await;

        info!(
            tenant_id = %self.config.tenant_id(),
            accounts = snapshot.len(),
            published = published.len(),
            "Reminder scan finished"
        );
        Ok(published)
    }

    /// Spawns the scan loop. The first scan runs immediately.
    pub fn start(self) -> ReminderAgentHandle {
        let (command_tx, command_rx) = mpsc::channel(8);

        info!(
            tenant_id = %self.config.tenant_id(),
            interval_secs = self.config.reminders.scan_interval_secs,
            "Starting reminder agent"
        );

        let task = tokio::spawn(self.run(command_rx));
        ReminderAgentHandle { command_tx, task }
    }

    async fn run(self, mut command_rx: mpsc::Receiver<AgentCommand>) {
        let period = Duration::from_secs(self.config.reminders.scan_interval_secs.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.scan_logged().await;
                }

                command = command_rx.recv() => match command {
                    Some(AgentCommand::ScanNow) => {
                        debug!("Manual scan requested");
                        self.scan_logged().await;
                    }
                    Some(AgentCommand::Shutdown) | None => {
                        info!("Reminder agent shutting down");
                        break;
                    }
                },
            }
        }

        info!("Reminder agent stopped");
    }

    async fn scan_logged(&self) {
        let today = Local::now().date_naive();
        if let Err(e) = self.run_once(today).await {
            error!(error = %e, "Reminder scan failed");
        }
    }
}

// =============================================================================
// Agent Handle
// =============================================================================

/// Controls a running [`ReminderAgent`].
pub struct ReminderAgentHandle {
    command_tx: mpsc::Sender<AgentCommand>,
    task: JoinHandle<()>,
}

impl ReminderAgentHandle {
    /// Requests an immediate scan.
    pub async fn scan_now(&self) -> NotifyResult<()> {
        self.command_tx
            .send(AgentCommand::ScanNow)
            .await
            .map_err(|_| NotifyError::ShuttingDown)
    }

    /// Stops the agent and waits for the loop to exit.
    pub async fn shutdown(self) -> NotifyResult<()> {
        // a closed channel means the loop already exited
        let _ = self.command_tx.send(AgentCommand::Shutdown).await;
        self.task
            .await
            .map_err(|e| NotifyError::ChannelError(e.to_string()))
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

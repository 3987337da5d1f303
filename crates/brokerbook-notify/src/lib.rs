//! # brokerbook-notify: Payment Reminders for Brokerbook
//!
//! Turns reconciled sale balances into buyer and seller notifications.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Reminder Architecture                            │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                   ReminderAgent (orchestrator)                   │  │
//! │  │  Spawned as a Tokio task, scans on an interval or on request     │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ SalesSnapshot  │  │ReminderScanner │  │  NotificationHub       │    │
//! │  │                │  │                │  │                        │    │
//! │  │ JSON export of │  │ build_statement│  │ Dedup, bounded history │    │
//! │  │ open sales     │  │ per sale, due  │  │ broadcast to listeners │    │
//! │  │                │  │ & overdue rules│  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`agent`] - `ReminderAgent` scan loop and its handle
//! - [`config`] - Tenant, reminder window and hub settings (TOML + env)
//! - [`error`] - Notify error types
//! - [`hub`] - In-process notification store and fan-out
//! - [`notification`] - Notification model
//! - [`reminder`] - Reminder rules over sale statements
//! - [`snapshot`] - Sales snapshot loader
//!
//! ## Usage
//!
//! ```rust,ignore
//! use brokerbook_notify::{NotificationHub, NotifyConfig, ReminderAgent};
//!
//! let config = NotifyConfig::load_or_default(None);
//! let hub = NotificationHub::new(&config.hub);
//!
//! let handle = ReminderAgent::new(config, hub.clone()).start();
//! let unread = hub.unread_count("buyer-1").await;
//! handle.shutdown().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agent;
pub mod config;
pub mod error;
pub mod hub;
pub mod notification;
pub mod reminder;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use agent::{ReminderAgent, ReminderAgentHandle};
pub use config::{HubSettings, NotifyConfig, ReminderSettings, SnapshotSettings, TenantConfig};
pub use error::{NotifyError, NotifyResult};
pub use hub::NotificationHub;
pub use notification::{Notification, NotificationKind};
pub use reminder::{ReminderScanner, SaleAccount, ScanReport, SkippedSale};
pub use snapshot::SalesSnapshot;

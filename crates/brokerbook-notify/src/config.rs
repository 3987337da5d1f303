//! # Notify Configuration
//!
//! Configuration management for the reminder service.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BROKERBOOK_TENANT_ID=acme-brokers                                  │
//! │     BROKERBOOK_SNAPSHOT_PATH=/var/lib/brokerbook/sales.json            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/brokerbook/notify.toml (Linux)                           │
//! │     ~/Library/Application Support/com.brokerbook.brokerbook/notify.toml│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     3-day due-soon window, hourly scan                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # notify.toml
//! [tenant]
//! id = "acme-brokers"
//! name = "Acme Brokers"
//!
//! [reminders]
//! due_soon_days = 3
//! overdue_repeat_days = 7
//! scan_interval_secs = 3600
//! include_commissions = true
//!
//! [hub]
//! history_limit = 500
//! channel_capacity = 256
//!
//! [reconcile]
//! join = "id_then_name"     # id_then_name | name_only
//! basis = "net_of_returns"  # net_of_returns | gross
//!
//! [snapshot]
//! path = "/var/lib/brokerbook/sales.json"
//! ```

use brokerbook_core::ReconcileOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{NotifyError, NotifyResult};

// =============================================================================
// Tenant Configuration
// =============================================================================

/// The brokerage this service sends reminders for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConfig {
    pub id: String,

    #[serde(default)]
    pub name: String,
}

impl Default for TenantConfig {
    fn default() -> Self {
        TenantConfig {
            id: "default-tenant".to_string(),
            name: "Brokerbook".to_string(),
        }
    }
}

// =============================================================================
// Reminder Settings
// =============================================================================

/// When reminders fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
    /// Days before the due date at which a due-soon reminder goes out.
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: u32,

    /// An overdue sale is reminded again every this many days.
    #[serde(default = "default_overdue_repeat_days")]
    pub overdue_repeat_days: u32,

    /// Interval between snapshot scans (seconds).
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,

    /// Also remind sellers about unpaid broker commission.
    #[serde(default = "default_true")]
    pub include_commissions: bool,
}

fn default_due_soon_days() -> u32 {
    3
}

fn default_overdue_repeat_days() -> u32 {
    7
}

fn default_scan_interval() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

impl Default for ReminderSettings {
    fn default() -> Self {
        ReminderSettings {
            due_soon_days: default_due_soon_days(),
            overdue_repeat_days: default_overdue_repeat_days(),
            scan_interval_secs: default_scan_interval(),
            include_commissions: true,
        }
    }
}

// =============================================================================
// Hub Settings
// =============================================================================

/// Notification hub sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubSettings {
    /// Notifications kept in history; the oldest are evicted first.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Broadcast buffer per subscriber. Slower subscribers skip ahead.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_history_limit() -> usize {
    500
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for HubSettings {
    fn default() -> Self {
        HubSettings {
            history_limit: default_history_limit(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

// =============================================================================
// Snapshot Settings
// =============================================================================

/// Where the backend export of sales lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSettings {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main Notify Configuration
// =============================================================================

/// Complete reminder service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub tenant: TenantConfig,

    #[serde(default)]
    pub reminders: ReminderSettings,

    #[serde(default)]
    pub hub: HubSettings,

    /// Passed straight to the reconciliation engine.
    #[serde(default)]
    pub reconcile: ReconcileOptions,

    #[serde(default)]
    pub snapshot: SnapshotSettings,
}

impl NotifyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (notify.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> NotifyResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading notify config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| NotifyError::ConfigLoadFailed(format!("{}: {e}", path.display())))?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load notify config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document. Missing sections take their defaults.
    pub fn from_toml(contents: &str) -> NotifyResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> NotifyResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| NotifyError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| NotifyError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| NotifyError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Notify config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> NotifyResult<()> {
        if self.tenant.id.trim().is_empty() {
            return Err(NotifyError::InvalidConfig("tenant.id must not be empty".into()));
        }

        if self.reminders.overdue_repeat_days == 0 {
            return Err(NotifyError::InvalidConfig(
                "reminders.overdue_repeat_days must be greater than 0".into(),
            ));
        }

        if self.reminders.scan_interval_secs == 0 {
            return Err(NotifyError::InvalidConfig(
                "reminders.scan_interval_secs must be greater than 0".into(),
            ));
        }

        if self.hub.history_limit == 0 || self.hub.channel_capacity == 0 {
            return Err(NotifyError::InvalidConfig(
                "hub.history_limit and hub.channel_capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `BROKERBOOK_*` overrides read through `lookup`.
    /// Unparseable values are logged and ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup("BROKERBOOK_TENANT_ID") {
            debug!(tenant_id = %id, "Overriding tenant ID from environment");
            self.tenant.id = id;
        }

        if let Some(path) = lookup("BROKERBOOK_SNAPSHOT_PATH") {
            debug!(path = %path, "Overriding snapshot path from environment");
            self.snapshot.path = Some(PathBuf::from(path));
        }

        if let Some(days) = lookup("BROKERBOOK_DUE_SOON_DAYS") {
            match days.parse::<u32>() {
                Ok(d) => self.reminders.due_soon_days = d,
                Err(_) => warn!(value = %days, "Invalid BROKERBOOK_DUE_SOON_DAYS"),
            }
        }

        if let Some(secs) = lookup("BROKERBOOK_SCAN_INTERVAL_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.reminders.scan_interval_secs = s,
                Err(_) => warn!(value = %secs, "Invalid BROKERBOOK_SCAN_INTERVAL_SECS"),
            }
        }

        if let Some(join) = lookup("BROKERBOOK_JOIN_POLICY") {
            match join.parse() {
                Ok(policy) => self.reconcile.join = policy,
                Err(e) => warn!(value = %join, error = %e, "Unknown join policy in environment"),
            }
        }

        if let Some(basis) = lookup("BROKERBOOK_QUANTITY_BASIS") {
            match basis.parse() {
                Ok(parsed) => self.reconcile.basis = parsed,
                Err(e) => warn!(value = %basis, error = %e, "Unknown quantity basis in environment"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "brokerbook", "brokerbook")
            .map(|dirs| dirs.config_dir().join("notify.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn tenant_id(&self) -> &str {
        &self.tenant.id
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.path.as_deref()
    }
}

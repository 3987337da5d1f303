//! # Notify Error Types
//!
//! Error types for the reminder service.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Notify Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Snapshot     │  │     Hub / Agent         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  SnapshotRead   │  │  NotFound               │ │
//! │  │  ConfigLoad     │  │  Deserialize    │  │  ChannelError           │ │
//! │  │  ConfigSave     │  │  Core           │  │  ShuttingDown           │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use brokerbook_core::CoreError;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for notify operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors raised by the reminder service.
#[derive(Debug, Error)]
pub enum NotifyError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid notify configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Snapshot Errors
    // =========================================================================
    /// Snapshot file could not be read.
    #[error("Failed to read snapshot: {0}")]
    SnapshotRead(#[from] std::io::Error),

    /// Snapshot or payload JSON was malformed.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[from] serde_json::Error),

    /// Reconciliation rejected the data.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Hub / Agent Errors
    // =========================================================================
    /// No notification with this id.
    #[error("Notification {0} not found")]
    NotFound(Uuid),

    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// Agent is shutting down.
    #[error("Reminder agent is shutting down")]
    ShuttingDown,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<toml::de::Error> for NotifyError {
    fn from(err: toml::de::Error) -> Self {
        NotifyError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for NotifyError {
    fn from(err: toml::ser::Error) -> Self {
        NotifyError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl NotifyError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            NotifyError::InvalidConfig(_)
                | NotifyError::ConfigLoadFailed(_)
                | NotifyError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the input data, not the service, is at fault.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            NotifyError::DeserializationFailed(_) | NotifyError::Core(_)
        )
    }
}

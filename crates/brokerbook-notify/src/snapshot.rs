//! # Sales Snapshot
//!
//! The backend exports open sales as a JSON array of [`SaleAccount`]
//! (camelCase, same shapes as its REST payloads). The agent re-reads the
//! file on every scan.

use std::path::Path;

use tracing::debug;

use crate::error::NotifyResult;
use crate::reminder::SaleAccount;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesSnapshot {
    pub accounts: Vec<SaleAccount>,
}

impl SalesSnapshot {
    pub fn from_json(json: &str) -> NotifyResult<Self> {
        let accounts: Vec<SaleAccount> = serde_json::from_str(json)?;
        Ok(SalesSnapshot { accounts })
    }

    pub fn load(path: &Path) -> NotifyResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json(&contents)?;
        debug!(path = %path.display(), accounts = snapshot.len(), "Loaded sales snapshot");
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

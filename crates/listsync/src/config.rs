//! List synchronization runtime configuration.

use crate::errors::{ListSyncError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which version of a list incoming commands are checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionReference {
    /// The peer's own optimistic edge, including unapproved local commands
    Local,
    /// The last state all peers agreed on
    #[default]
    Approved,
}

/// Command filter settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Version commands must start from to be accepted
    pub reference: VersionReference,
}

/// Retention of objects referenced by dropped commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceKeeperConfig {
    /// How long a pinned object is retained
    pub pin_ttl_ms: u64,
    /// Upper bound on simultaneously pinned objects
    pub max_pinned: usize,
}

impl ReferenceKeeperConfig {
    /// Retention period as a duration
    pub fn pin_ttl(&self) -> Duration {
        Duration::from_millis(self.pin_ttl_ms)
    }

    /// Reject settings that would release pins before a resend can arrive
    pub fn validate(&self) -> Result<()> {
        if self.pin_ttl_ms == 0 {
            return Err(ListSyncError::invalid_config(
                "reference_keeper.pin_ttl_ms must be greater than zero",
            ));
        }
        if self.max_pinned == 0 {
            return Err(ListSyncError::invalid_config(
                "reference_keeper.max_pinned must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for ReferenceKeeperConfig {
    fn default() -> Self {
        Self {
            pin_ttl_ms: 30_000,
            max_pinned: 1024,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListSyncConfig {
    /// Command filter settings
    pub filter: FilterConfig,
    /// Pin retention settings
    pub reference_keeper: ReferenceKeeperConfig,
}

impl ListSyncConfig {
    /// Parse and validate a TOML document
    ///
    /// Missing sections and keys fall back to their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        self.reference_keeper.validate()
    }
}

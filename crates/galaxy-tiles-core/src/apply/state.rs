//! Applier states and the pre-apply snapshot.

use crate::config::{RunConfig, SettleTimings};
use crate::platform::ConfigValue;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Progress of one application, in strict forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyState {
    Idle,
    /// Live layout exported to the backup file.
    BackedUp,
    /// Existing policy values read.
    Inspected,
    /// User agreed, or confirmation was skipped.
    Confirmed,
    /// Policy points at the layout document and locks it.
    Locked,
    /// Shell restarted and given time to load the locked layout.
    Settled,
    /// Lock released; the arrangement persists.
    Unlocked,
    /// Policy values removed again.
    CleanedUp,
    /// User declined; nothing was written.
    Cancelled,
}

impl fmt::Display for ApplyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApplyState::Idle => "idle",
            ApplyState::BackedUp => "backed up",
            ApplyState::Inspected => "inspected",
            ApplyState::Confirmed => "confirmed",
            ApplyState::Locked => "locked",
            ApplyState::Settled => "settled",
            ApplyState::Unlocked => "unlocked",
            ApplyState::CleanedUp => "cleaned up",
            ApplyState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Policy values found before anything was written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellConfigurationSnapshot {
    pub layout_file: Option<ConfigValue>,
    pub locked: Option<ConfigValue>,
}

impl ShellConfigurationSnapshot {
    /// Either value exists, so a layout may have been applied before.
    pub fn has_prior_application(&self) -> bool {
        self.layout_file.is_some() || self.locked.is_some()
    }
}

/// Inputs of the applier taken from the run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplySettings {
    /// Absolute path written into the policy.
    pub layout_file: PathBuf,
    pub backup_file: PathBuf,
    pub skip_confirmation: bool,
    pub timings: SettleTimings,
}

impl ApplySettings {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            layout_file: config.layout_file.clone(),
            backup_file: config.backup_file.clone(),
            skip_confirmation: config.skip_confirmation,
            timings: config.timings,
        }
    }
}

/// How an application ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApplyOutcome {
    Completed { collision: bool },
    Cancelled { collision: bool },
}

impl ApplyOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ApplyOutcome::Completed { .. })
    }

    /// Policy values existed before the run.
    pub fn collision(&self) -> bool {
        match self {
            ApplyOutcome::Completed { collision } | ApplyOutcome::Cancelled { collision } => {
                *collision
            }
        }
    }
}

//! Apply a layout document through the Start layout policy.

use super::prompt::Confirmation;
use super::state::{ApplyOutcome, ApplySettings, ApplyState, ShellConfigurationSnapshot};
use crate::config::ShellPolicy;
use crate::error::{Result, TilesError};
use crate::platform::{CommandRunner, ConfigStore, ConfigValue};
use crate::shortcut::{CommandBatch, ShellCommand};
use tracing::{debug, info, warn};

const IRREVERSIBLE_WARNING: &str = "The script will now create registry values to modify the Start Menu. \
The groups in your Start Menu will probably be reordered. If there was a custom Start Layout .xml file \
applied before, all tiles will be removed! Use at own risk!";

/// Drives the backup, lock, settle, unlock and cleanup sequence.
///
/// Each step advances [`ApplyState`] by exactly one state. A run stops at
/// the first failing step and the error names the values that may have been
/// left behind.
pub struct ShellConfigurationApplier<'a, R, S, P>
where
    R: CommandRunner + ?Sized,
    S: ConfigStore + ?Sized,
    P: Confirmation + ?Sized,
{
    runner: &'a R,
    store: &'a mut S,
    prompt: &'a mut P,
    settings: ApplySettings,
    state: ApplyState,
}

impl<'a, R, S, P> ShellConfigurationApplier<'a, R, S, P>
where
    R: CommandRunner + ?Sized,
    S: ConfigStore + ?Sized,
    P: Confirmation + ?Sized,
{
    pub fn new(runner: &'a R, store: &'a mut S, prompt: &'a mut P, settings: ApplySettings) -> Self {
        Self {
            runner,
            store,
            prompt,
            settings,
            state: ApplyState::Idle,
        }
    }

    pub fn state(&self) -> ApplyState {
        self.state
    }

    pub fn settings(&self) -> &ApplySettings {
        &self.settings
    }

    /// Run the whole sequence.
    ///
    /// A declined confirmation is not an error: it returns
    /// [`ApplyOutcome::Cancelled`] and moves the state to `Cancelled` with
    /// nothing written.
    pub async fn apply(&mut self) -> Result<ApplyOutcome> {
        if self.state != ApplyState::Idle {
            return Err(TilesError::config(format!(
                "layout application already ran (state: {})",
                self.state
            )));
        }

        info!("Updating Start Menu...");
        self.backup().await?;

        let snapshot = self.inspect()?;
        let collision = snapshot.has_prior_application();

        if !self.confirm() {
            info!("Script cancelled by user.");
            return Ok(ApplyOutcome::Cancelled { collision });
        }

        self.lock().await?;
        self.settle().await;
        self.unlock().await?;
        self.cleanup()?;

        info!("Start Menu updated");
        Ok(ApplyOutcome::Completed { collision })
    }

    /// Idle → BackedUp
    async fn backup(&mut self) -> Result<()> {
        let backup = &self.settings.backup_file;
        let batch = CommandBatch::single(
            "layout backup",
            ShellCommand::ExportStartLayout {
                destination: backup.clone(),
            },
        );

        let output = self
            .runner
            .run(&batch)
            .await
            .map_err(|e| TilesError::BackupFailed {
                path: backup.clone(),
                message: e.to_string(),
            })?;
        if !output.is_clean() {
            return Err(TilesError::BackupFailed {
                path: backup.clone(),
                message: output.diagnostics(),
            });
        }

        debug!("Exported current Start layout to {}", backup.display());
        self.state = ApplyState::BackedUp;
        Ok(())
    }

    /// BackedUp → Inspected
    fn inspect(&mut self) -> Result<ShellConfigurationSnapshot> {
        let read = |name: &str| {
            self.store
                .get_value(name)
                .map_err(|e| TilesError::ConfigUnavailable {
                    message: e.to_string(),
                })
        };
        let snapshot = ShellConfigurationSnapshot {
            layout_file: read(ShellPolicy::LAYOUT_FILE_VALUE)?,
            locked: read(ShellPolicy::LOCKED_VALUE)?,
        };

        if snapshot.has_prior_application() {
            warn!(
                "Registry Value '{}' or '{}' exists. There might have been a Start Layout previously applied! This would be removed entirely!",
                ShellPolicy::LAYOUT_FILE_VALUE,
                ShellPolicy::LOCKED_VALUE
            );
        }

        self.state = ApplyState::Inspected;
        Ok(snapshot)
    }

    /// Inspected → Confirmed, or Cancelled
    fn confirm(&mut self) -> bool {
        if !self.settings.skip_confirmation && !self.prompt.confirm(IRREVERSIBLE_WARNING) {
            self.state = ApplyState::Cancelled;
            return false;
        }
        self.state = ApplyState::Confirmed;
        true
    }

    /// Confirmed → Locked
    async fn lock(&mut self) -> Result<()> {
        let layout = self.settings.layout_file.display().to_string();
        self.store
            .set_value(
                ShellPolicy::LAYOUT_FILE_VALUE,
                &ConfigValue::ExpandString(layout),
            )
            .and_then(|_| {
                self.store
                    .set_value(ShellPolicy::LOCKED_VALUE, &ConfigValue::DWord(1))
            })
            .map_err(|e| TilesError::LockWriteFailed {
                message: e.to_string(),
                recovery: self.recovery("may be set without the other"),
            })?;

        self.state = ApplyState::Locked;
        self.restart_shell().await;
        Ok(())
    }

    /// Locked → Settled
    async fn settle(&mut self) {
        tokio::time::sleep(self.settings.timings.lock_settle).await;
        self.state = ApplyState::Settled;
    }

    /// Settled → Unlocked
    async fn unlock(&mut self) -> Result<()> {
        self.store
            .set_value(ShellPolicy::LOCKED_VALUE, &ConfigValue::DWord(0))
            .map_err(|e| TilesError::UnlockWriteFailed {
                message: e.to_string(),
                recovery: self.recovery("still lock the Start Menu"),
            })?;

        self.state = ApplyState::Unlocked;
        self.restart_shell().await;
        tokio::time::sleep(self.settings.timings.unlock_settle).await;
        Ok(())
    }

    /// Unlocked → CleanedUp
    fn cleanup(&mut self) -> Result<()> {
        self.store
            .delete_value(ShellPolicy::LAYOUT_FILE_VALUE)
            .and_then(|_| self.store.delete_value(ShellPolicy::LOCKED_VALUE))
            .map_err(|e| TilesError::CleanupFailed {
                message: e.to_string(),
                recovery: self.recovery("still point at the generated layout"),
            })?;

        self.state = ApplyState::CleanedUp;
        Ok(())
    }

    /// Stop the shell so it restarts and reloads the policy.
    async fn restart_shell(&self) {
        let batch = CommandBatch::single(
            "shell restart",
            ShellCommand::StopProcess {
                name: ShellPolicy::SHELL_PROCESS.to_string(),
            },
        );
        match self.runner.run(&batch).await {
            Ok(output) if output.success => debug!("Restarted {}", ShellPolicy::SHELL_PROCESS),
            Ok(output) => warn!(
                "Could not restart {}: {}",
                ShellPolicy::SHELL_PROCESS,
                output.diagnostics()
            ),
            Err(e) => warn!("Could not restart {}: {}", ShellPolicy::SHELL_PROCESS, e),
        }
    }

    fn recovery(&self, condition: &str) -> String {
        format!(
            "The values '{}' and '{}' under HKEY_CURRENT_USER\\{} {}. Delete both values and restore your previous layout from {}",
            ShellPolicy::LAYOUT_FILE_VALUE,
            ShellPolicy::LOCKED_VALUE,
            ShellPolicy::KEY_PATH,
            condition,
            self.settings.backup_file.display()
        )
    }
}

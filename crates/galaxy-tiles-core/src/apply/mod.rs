//! Applying a layout document to the live Start Menu.
//!
//! The shell only reads a partial layout while the policy locks it, so the
//! document is applied by locking, restarting the shell, and unlocking again.
//! The arrangement survives the unlock; the policy values are removed at the
//! end so the user can rearrange tiles afterwards.

mod applier;
mod prompt;
mod state;

pub use applier::ShellConfigurationApplier;
pub use prompt::{is_affirmative, Confirmation, StdinConfirmation};
pub use state::{ApplyOutcome, ApplySettings, ApplyState, ShellConfigurationSnapshot};

//! Galaxy Tiles - Headless library that turns a GOG Galaxy 2.0 library into
//! Windows 10 Start Menu tiles.
//!
//! A run reads the games matching a [`Selector`] from the Galaxy database,
//! packs them into fixed-size tile groups, writes a launcher, a visual
//! elements manifest and a shortcut per game, and finally applies the
//! generated partial Start layout by briefly locking it through the layout
//! policy.
//!
//! # Example
//!
//! ```rust,ignore
//! use galaxy_tiles::{
//!     pipeline, PowerShellRunner, RegistryStore, RunConfig, ShellPolicy, SqliteGameStore,
//!     StdinConfirmation,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> galaxy_tiles::Result<()> {
//!     let config = RunConfig::builder().build()?;
//!     let source = SqliteGameStore::open(&config.database)?;
//!     let mut store = RegistryStore::open_current_user(ShellPolicy::KEY_PATH)?;
//!
//!     let summary = pipeline::run(
//!         &config,
//!         source,
//!         &PowerShellRunner::new(),
//!         &mut store,
//!         &mut StdinConfirmation::new(),
//!     )
//!     .await?;
//!     println!("Placed {} games", summary.games);
//!     Ok(())
//! }
//! ```

pub mod apply;
pub mod catalog;
pub mod config;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod platform;
pub mod shortcut;

// Re-export commonly used types
pub use apply::{
    ApplyOutcome, ApplySettings, ApplyState, Confirmation, ShellConfigurationApplier,
    ShellConfigurationSnapshot, StdinConfirmation,
};
pub use catalog::{
    CatalogWarning, GameCatalog, GameRecord, GameSource, LoadedCatalog, RawGameRow,
    SqliteGameStore,
};
pub use config::{
    CatalogLimits, GalaxyPaths, GridSettings, GridWidth, LayoutFiles, RunConfig,
    RunConfigBuilder, Selector, SettleTimings, ShellPolicy, TileSize,
};
pub use error::{Result, TilesError};
pub use layout::{LayoutDocument, TileGroup, TileLayoutPlanner, TilePlacement};
pub use pipeline::RunSummary;
#[cfg(windows)]
pub use platform::RegistryStore;
pub use platform::{CommandOutput, CommandRunner, ConfigStore, ConfigValue, PowerShellRunner};
pub use shortcut::{CommandBatch, ShellCommand, ShortcutArtifact, ShortcutPlan};

//! One complete run: catalog, layout, shortcuts, application.

use crate::apply::{ApplyOutcome, ApplySettings, Confirmation, ShellConfigurationApplier};
use crate::catalog::{CatalogWarning, GameCatalog, GameSource};
use crate::config::RunConfig;
use crate::error::Result;
use crate::layout::TileLayoutPlanner;
use crate::platform::{CommandRunner, ConfigStore};
use crate::shortcut::{CommandBatch, ShortcutPlan};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub selector: String,
    pub games: usize,
    pub groups: usize,
    pub icon_downloads: usize,
    pub duplicates: usize,
    pub shortcut_dir: PathBuf,
    pub layout_file: PathBuf,
    pub backup_file: PathBuf,
    pub outcome: ApplyOutcome,
}

/// Run every phase in order and apply the result to the Start Menu.
///
/// Nothing touches the filesystem before the catalog has been loaded and
/// validated. Failed downloads or shortcut commands are logged and the run
/// continues; everything else stops the run.
pub async fn run<G, R, S, P>(
    config: &RunConfig,
    source: G,
    runner: &R,
    store: &mut S,
    prompt: &mut P,
) -> Result<RunSummary>
where
    G: GameSource,
    R: CommandRunner + ?Sized,
    S: ConfigStore + ?Sized,
    P: Confirmation + ?Sized,
{
    let catalog = GameCatalog::new(source).load(&config.selector)?;
    let games = &catalog.games;

    let planner = TileLayoutPlanner::from_settings(&config.grid);
    let document = planner.plan(games);
    debug!(
        "{} tiles in {} groups of {}",
        document.tile_count(),
        document.groups.len(),
        planner.capacity()
    );

    info!("Creating shortcuts...");
    let shortcuts = ShortcutPlan::build(
        games,
        &config.shortcut_dir,
        config.grid.tile_size,
        config.hide_name,
        config.force,
        &config.galaxy_client,
    );
    shortcuts.write_artifacts()?;
    if !shortcuts.downloads.is_empty() {
        run_batch(runner, &shortcuts.downloads).await?;
    }
    run_batch(runner, &shortcuts.shortcuts).await?;

    info!("Creating Start Menu layout...");
    document.write_to_file(&config.layout_file, &config.shortcut_dir)?;

    // The shell needs time to register new shortcuts before a layout can
    // reference them.
    tokio::time::sleep(config.timings.shortcut_registration).await;

    let mut applier =
        ShellConfigurationApplier::new(runner, store, prompt, ApplySettings::from_config(config));
    let outcome = applier.apply().await?;

    info!("Program finished!");
    Ok(RunSummary {
        selector: config.selector.to_string(),
        games: games.len(),
        groups: document.groups.len(),
        icon_downloads: shortcuts.downloads.len(),
        duplicates: catalog
            .warnings
            .iter()
            .filter(|w| matches!(w, CatalogWarning::DuplicateTitle { .. }))
            .count(),
        shortcut_dir: config.shortcut_dir.clone(),
        layout_file: config.layout_file.clone(),
        backup_file: config.backup_file.clone(),
        outcome,
    })
}

async fn run_batch<R: CommandRunner + ?Sized>(runner: &R, batch: &CommandBatch) -> Result<()> {
    let output = runner.run(batch).await?;
    if !output.is_clean() {
        warn!("Some commands of {} reported errors", batch.label());
    }
    Ok(())
}

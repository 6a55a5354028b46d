//! Galaxy Tiles CLI - builds Start Menu tiles for a GOG Galaxy 2.0 library.
//!
//! Reads the selected games from the Galaxy database, creates a shortcut per
//! game and applies a partial Start layout containing them.

use anyhow::{Context, Result};
use clap::Parser;
use galaxy_tiles::{
    platform, GalaxyPaths, GridWidth, RunConfig, RunSummary, Selector, TileSize, TilesError,
};
use std::path::PathBuf;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "galaxy-tiles")]
#[command(version, about = "Create Start Menu tiles for your GOG Galaxy 2.0 games")]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "INFO")]
    level: String,

    /// Path to the GOG Galaxy 2.0 database
    #[arg(long, default_value = GalaxyPaths::DEFAULT_DATABASE)]
    database: PathBuf,

    /// Folder for the game shortcuts (defaults to the GOG.com\GameTiles Start Menu folder)
    #[arg(long)]
    start_folder: Option<PathBuf>,

    /// Path to GalaxyClient.exe
    #[arg(long, default_value = GalaxyPaths::DEFAULT_CLIENT)]
    galaxy_client: PathBuf,

    /// Medium tiles per group row (3 or 4)
    #[arg(long, default_value_t = 3)]
    width: u32,

    /// Rows of medium tiles per group
    #[arg(long, default_value_t = 7)]
    height: u32,

    /// Tile size: 1 (small) or 2 (medium)
    #[arg(long, default_value_t = 2)]
    tile_size: u32,

    /// Name of the tile groups
    #[arg(long, default_value = "")]
    group_name: String,

    /// Tag selecting the games; INSTALLED and ALL select installed or owned games
    #[arg(long, default_value = "StartMenuTiles")]
    tag_name: String,

    /// Hide the game title on medium tiles
    #[arg(long)]
    hide_name: bool,

    /// Download icons again even if they exist
    #[arg(long)]
    force: bool,

    /// Do not ask before changing the Start Menu
    #[arg(short, long)]
    yes: bool,

    /// Where to write the partial Start layout
    #[arg(long)]
    layout_file: Option<PathBuf>,

    /// Where to export the current Start layout
    #[arg(long)]
    backup_file: Option<PathBuf>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn parse_level(level: &str) -> Result<Level, TilesError> {
    match level.to_ascii_lowercase().as_str() {
        "panic" | "fatal" => Ok(Level::ERROR),
        other => other
            .parse::<Level>()
            .map_err(|_| TilesError::config(format!("unknown log level '{}'", level))),
    }
}

fn build_config(args: &Args) -> Result<RunConfig, TilesError> {
    let tile_size = TileSize::from_value(args.tile_size)
        .ok_or_else(|| TilesError::config("tile size has to be 1 or 2."))?;
    let width = GridWidth::from_value(args.width)
        .ok_or_else(|| TilesError::config("width has to be 3 or 4."))?;

    let mut builder = RunConfig::builder()
        .database(&args.database)
        .selector(Selector::from_tag_name(&args.tag_name))
        .group_name(&args.group_name)
        .tile_size(tile_size)
        .width(width)
        .height(args.height)
        .galaxy_client(&args.galaxy_client)
        .hide_name(args.hide_name)
        .force(args.force)
        .skip_confirmation(args.yes);

    if let Some(dir) = &args.start_folder {
        builder = builder.shortcut_dir(dir);
    }
    if let Some(path) = &args.layout_file {
        builder = builder.layout_file(path);
    }
    if let Some(path) = &args.backup_file {
        builder = builder.backup_file(path);
    }

    builder.build()
}

/// Follow-up advice for a failed run.
fn failure_hints(err: &TilesError) -> Vec<&'static str> {
    let mut hints = Vec::new();
    if err.leaves_partial_state() {
        hints.push("The Start Menu policy values may be left behind. Follow the recovery steps above before running again.");
    }
    if err.requires_elevation() {
        hints.push("Try running galaxy-tiles from an elevated prompt.");
    }
    hints
}

#[cfg(windows)]
async fn execute(config: &RunConfig) -> galaxy_tiles::Result<RunSummary> {
    use galaxy_tiles::{
        pipeline, PowerShellRunner, RegistryStore, ShellPolicy, SqliteGameStore, StdinConfirmation,
    };

    let source = SqliteGameStore::open(&config.database)?;
    let mut store = RegistryStore::open_current_user(ShellPolicy::KEY_PATH).map_err(|e| {
        TilesError::ConfigUnavailable {
            message: e.to_string(),
        }
    })?;

    pipeline::run(
        config,
        source,
        &PowerShellRunner::new(),
        &mut store,
        &mut StdinConfirmation::new(),
    )
    .await
}

#[cfg(not(windows))]
async fn execute(_config: &RunConfig) -> galaxy_tiles::Result<RunSummary> {
    Err(TilesError::config(format!(
        "the Start Menu can only be configured on Windows, not on {}",
        platform::current_platform()
    )))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = parse_level(&args.level)?;
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = build_config(&args)?;
    info!(
        "Placing {} in {} ({})",
        config.selector,
        config.shortcut_dir.display(),
        platform::current_platform()
    );

    let summary = match execute(&config).await {
        Ok(summary) => summary,
        Err(err) => {
            error!("{}", err);
            for hint in failure_hints(&err) {
                warn!("{}", hint);
            }
            return Err(err.into());
        }
    };

    if summary.outcome.collision() {
        warn!("A previously applied Start layout was found and has been replaced");
    }
    if !summary.outcome.is_completed() {
        info!("Start Menu left unchanged; shortcuts are in {}", summary.shortcut_dir.display());
    }

    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("Could not encode run summary")?;
        println!("{}", json);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["galaxy-tiles", "--start-folder", "/tmp/GameTiles"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("INFO").unwrap(), Level::INFO);
        assert_eq!(parse_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_level("fatal").unwrap(), Level::ERROR);
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_failure_hints() {
        let partial = TilesError::UnlockWriteFailed {
            message: "Access is denied.".into(),
            recovery: "restore StartLayoutBackup.xml".into(),
        };
        assert_eq!(failure_hints(&partial).len(), 2);

        let unreadable = TilesError::ConfigUnavailable {
            message: "Access is denied.".into(),
        };
        assert_eq!(
            failure_hints(&unreadable),
            vec!["Try running galaxy-tiles from an elevated prompt."]
        );

        let empty = TilesError::EmptyResult {
            selector: "tag 'StartMenuTiles'".into(),
        };
        assert!(failure_hints(&empty).is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = build_config(&args(&[])).unwrap();
        assert_eq!(config.selector, Selector::Tag("StartMenuTiles".into()));
        assert_eq!(config.grid.tile_size, TileSize::Medium);
        assert_eq!(config.grid.width, GridWidth::Three);
        assert_eq!(config.grid.height, 7);
        assert_eq!(config.shortcut_dir, PathBuf::from("/tmp/GameTiles"));
        assert!(!config.skip_confirmation);
    }

    #[test]
    fn test_flags() {
        let config = build_config(&args(&[
            "--tag-name",
            "INSTALLED",
            "--tile-size",
            "1",
            "--width",
            "4",
            "--group-name",
            "Games",
            "-y",
        ]))
        .unwrap();
        assert_eq!(config.selector, Selector::Installed);
        assert_eq!(config.grid.tile_size, TileSize::Small);
        assert_eq!(config.grid.width, GridWidth::Four);
        assert_eq!(config.grid.group_name, "Games");
        assert!(config.skip_confirmation);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let cases: [&[&str]; 3] = [&["--width", "5"], &["--tile-size", "3"], &["--height", "0"]];
        for extra in cases {
            let err = build_config(&args(extra)).unwrap_err();
            assert!(matches!(err, TilesError::Config { .. }), "{extra:?}");
        }
    }
}

//! Centralized configuration for galaxy-tiles.
//!
//! Fixed values live as associated constants on unit structs. Everything a
//! user can change is collected once into an immutable [`RunConfig`] that is
//! passed explicitly to each component.

use crate::error::{Result, TilesError};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Size limits for the catalog.
///
/// The shell misbehaves with large partial layouts, so both limits are
/// enforced exactly.
pub struct CatalogLimits;

impl CatalogLimits {
    /// Above this many games a warning is emitted.
    pub const SOFT_LIMIT: usize = 80;
    /// Above this many games the run is refused.
    pub const HARD_LIMIT: usize = 150;
    /// Tag used when no selector is given.
    pub const DEFAULT_TAG: &'static str = "StartMenuTiles";
}

/// Registry location and value names of the Start layout policy.
pub struct ShellPolicy;

impl ShellPolicy {
    pub const KEY_PATH: &'static str = r"Software\Policies\Microsoft\Windows\Explorer";
    pub const LAYOUT_FILE_VALUE: &'static str = "StartLayoutFile";
    pub const LOCKED_VALUE: &'static str = "LockedStartLayout";
    pub const SHELL_PROCESS: &'static str = "explorer";
}

/// Default locations of the GOG Galaxy installation.
pub struct GalaxyPaths;

impl GalaxyPaths {
    pub const DEFAULT_DATABASE: &'static str = "C:/ProgramData/GOG.com/Galaxy/storage/galaxy-2.0.db";
    pub const DEFAULT_CLIENT: &'static str = r"C:\Program Files (x86)\GOG Galaxy\GalaxyClient.exe";
    pub const ICON_BASE_URL: &'static str = "https://images.gog.com";
}

/// File names used for generated documents.
pub struct LayoutFiles;

impl LayoutFiles {
    pub const LAYOUT_FILE_NAME: &'static str = "PartialStartLayout.xml";
    pub const BACKUP_FILE_NAME: &'static str = "StartLayoutBackup.xml";
    pub const VISUAL_ELEMENTS_DIR: &'static str = "VisualElements";
    pub const ICON_PREFIX: &'static str = "MediumIcon";
}

/// Edge length of a single tile in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileSize {
    /// 1x1 tiles.
    Small,
    /// 2x2 tiles.
    Medium,
}

impl TileSize {
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            1 => Some(TileSize::Small),
            2 => Some(TileSize::Medium),
            _ => None,
        }
    }

    pub fn cells(&self) -> u32 {
        match self {
            TileSize::Small => 1,
            TileSize::Medium => 2,
        }
    }

    /// How many tiles of this size fit along one medium-tile slot.
    pub fn scale(&self) -> u32 {
        3 - self.cells()
    }
}

impl Default for TileSize {
    fn default() -> Self {
        TileSize::Medium
    }
}

/// Number of medium tiles per group row supported by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GridWidth {
    Three,
    Four,
}

impl GridWidth {
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            3 => Some(GridWidth::Three),
            4 => Some(GridWidth::Four),
            _ => None,
        }
    }

    pub fn value(&self) -> u32 {
        match self {
            GridWidth::Three => 3,
            GridWidth::Four => 4,
        }
    }
}

impl Default for GridWidth {
    fn default() -> Self {
        GridWidth::Three
    }
}

/// Which games are eligible for placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "tag", rename_all = "snake_case")]
pub enum Selector {
    /// Games carrying a user tag.
    Tag(String),
    /// Games currently installed.
    Installed,
    /// Every owned game.
    AllOwned,
}

impl Selector {
    /// Interpret a tag name the way the command line does.
    ///
    /// `INSTALLED` and `ALL` pick the two special modes, anything else is a tag.
    pub fn from_tag_name(name: &str) -> Self {
        match name {
            "INSTALLED" => Selector::Installed,
            "ALL" => Selector::AllOwned,
            tag => Selector::Tag(tag.to_string()),
        }
    }
}

impl Default for Selector {
    fn default() -> Self {
        Selector::Tag(CatalogLimits::DEFAULT_TAG.to_string())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Tag(tag) => write!(f, "tag '{}'", tag),
            Selector::Installed => write!(f, "installed games"),
            Selector::AllOwned => write!(f, "all owned games"),
        }
    }
}

/// Grid shape of the generated layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridSettings {
    pub group_name: String,
    pub tile_size: TileSize,
    pub width: GridWidth,
    /// Rows of medium tiles per group.
    pub height: u32,
}

impl GridSettings {
    /// More rows than this can never be filled within the catalog limit.
    pub const MAX_HEIGHT: u32 = CatalogLimits::HARD_LIMIT as u32;
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            group_name: String::new(),
            tile_size: TileSize::default(),
            width: GridWidth::default(),
            height: 7,
        }
    }
}

/// Fixed waits for the shell to pick up changes.
///
/// The shell reloads asynchronously and exposes no readiness signal, so these
/// are plain sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettleTimings {
    /// After shortcut creation, before touching the layout policy.
    pub shortcut_registration: Duration,
    /// After the locked restart, before unlocking.
    pub lock_settle: Duration,
    /// After the unlocked restart, before deleting the policy values.
    pub unlock_settle: Duration,
}

impl SettleTimings {
    pub const SHORTCUT_REGISTRATION: Duration = Duration::from_secs(8);
    pub const LOCK_SETTLE: Duration = Duration::from_secs(5);
    pub const UNLOCK_SETTLE: Duration = Duration::from_secs(3);

    /// No waiting at all.
    pub fn immediate() -> Self {
        Self {
            shortcut_registration: Duration::ZERO,
            lock_settle: Duration::ZERO,
            unlock_settle: Duration::ZERO,
        }
    }
}

impl Default for SettleTimings {
    fn default() -> Self {
        Self {
            shortcut_registration: Self::SHORTCUT_REGISTRATION,
            lock_settle: Self::LOCK_SETTLE,
            unlock_settle: Self::UNLOCK_SETTLE,
        }
    }
}

/// Complete, validated input of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub database: PathBuf,
    pub selector: Selector,
    pub grid: GridSettings,
    /// Folder receiving launchers, manifests, icons and shortcuts.
    pub shortcut_dir: PathBuf,
    pub galaxy_client: PathBuf,
    /// Absolute path of the generated layout document.
    pub layout_file: PathBuf,
    /// Absolute path of the exported layout backup.
    pub backup_file: PathBuf,
    pub hide_name: bool,
    pub force: bool,
    pub skip_confirmation: bool,
    pub timings: SettleTimings,
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::new()
    }
}

/// Builder for [`RunConfig`].
///
/// `build` performs every configuration check, so a constructed `RunConfig`
/// never fails validation later.
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    database: Option<PathBuf>,
    selector: Selector,
    grid: GridSettings,
    shortcut_dir: Option<PathBuf>,
    galaxy_client: Option<PathBuf>,
    layout_file: Option<PathBuf>,
    backup_file: Option<PathBuf>,
    hide_name: bool,
    force: bool,
    skip_confirmation: bool,
    timings: SettleTimings,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }

    pub fn selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    pub fn group_name(mut self, name: impl Into<String>) -> Self {
        self.grid.group_name = name.into();
        self
    }

    pub fn tile_size(mut self, size: TileSize) -> Self {
        self.grid.tile_size = size;
        self
    }

    pub fn width(mut self, width: GridWidth) -> Self {
        self.grid.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.grid.height = height;
        self
    }

    pub fn shortcut_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.shortcut_dir = Some(path.into());
        self
    }

    pub fn galaxy_client(mut self, path: impl Into<PathBuf>) -> Self {
        self.galaxy_client = Some(path.into());
        self
    }

    pub fn layout_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.layout_file = Some(path.into());
        self
    }

    pub fn backup_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.backup_file = Some(path.into());
        self
    }

    pub fn hide_name(mut self, hide: bool) -> Self {
        self.hide_name = hide;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn skip_confirmation(mut self, skip: bool) -> Self {
        self.skip_confirmation = skip;
        self
    }

    pub fn timings(mut self, timings: SettleTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<RunConfig> {
        if self.grid.height == 0 {
            return Err(TilesError::config("height has to be at least 1."));
        }
        if self.grid.height > GridSettings::MAX_HEIGHT {
            return Err(TilesError::config(format!(
                "height can not be larger than {}.",
                GridSettings::MAX_HEIGHT
            )));
        }

        let shortcut_dir = match self.shortcut_dir {
            Some(dir) => dir,
            None => crate::platform::start_menu_tiles_dir()?,
        };
        if shortcut_dir.as_os_str().is_empty() {
            return Err(TilesError::config("start folder must not be empty."));
        }

        let layout_file = absolute(
            self.layout_file
                .unwrap_or_else(|| PathBuf::from(LayoutFiles::LAYOUT_FILE_NAME)),
        )?;
        let backup_file = absolute(
            self.backup_file
                .unwrap_or_else(|| PathBuf::from(LayoutFiles::BACKUP_FILE_NAME)),
        )?;

        Ok(RunConfig {
            database: self
                .database
                .unwrap_or_else(|| PathBuf::from(GalaxyPaths::DEFAULT_DATABASE)),
            selector: self.selector,
            grid: self.grid,
            shortcut_dir,
            galaxy_client: self
                .galaxy_client
                .unwrap_or_else(|| PathBuf::from(GalaxyPaths::DEFAULT_CLIENT)),
            layout_file,
            backup_file,
            hide_name: self.hide_name,
            force: self.force,
            skip_confirmation: self.skip_confirmation,
            timings: self.timings,
        })
    }
}

/// The registry value must hold an absolute path, the shell has no notion of
/// our working directory.
fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    std::path::absolute(&path).map_err(|e| TilesError::io_with_path(e, path.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_size_values() {
        assert_eq!(TileSize::from_value(1), Some(TileSize::Small));
        assert_eq!(TileSize::from_value(2), Some(TileSize::Medium));
        assert_eq!(TileSize::from_value(3), None);
        assert_eq!(TileSize::Small.scale(), 2);
        assert_eq!(TileSize::Medium.scale(), 1);
    }

    #[test]
    fn test_grid_width_values() {
        assert_eq!(GridWidth::from_value(3), Some(GridWidth::Three));
        assert_eq!(GridWidth::from_value(4), Some(GridWidth::Four));
        assert_eq!(GridWidth::from_value(5), None);
    }

    #[test]
    fn test_selector_from_tag_name() {
        assert_eq!(Selector::from_tag_name("INSTALLED"), Selector::Installed);
        assert_eq!(Selector::from_tag_name("ALL"), Selector::AllOwned);
        assert_eq!(
            Selector::from_tag_name("Favorites"),
            Selector::Tag("Favorites".into())
        );
        assert_eq!(
            Selector::default(),
            Selector::Tag(CatalogLimits::DEFAULT_TAG.into())
        );
    }

    #[test]
    fn test_builder_rejects_zero_height() {
        let result = RunConfig::builder()
            .shortcut_dir("/tmp/tiles")
            .height(0)
            .build();
        assert!(matches!(result, Err(TilesError::Config { .. })));
    }

    #[test]
    fn test_builder_rejects_oversized_height() {
        let result = RunConfig::builder()
            .shortcut_dir("/tmp/tiles")
            .tile_size(TileSize::Small)
            .height(3_000_000_000)
            .build();
        assert!(matches!(result, Err(TilesError::Config { .. })));

        let largest = RunConfig::builder()
            .shortcut_dir("/tmp/tiles")
            .height(GridSettings::MAX_HEIGHT)
            .build();
        assert!(largest.is_ok());
    }

    #[test]
    fn test_builder_makes_document_paths_absolute() {
        let config = RunConfig::builder()
            .shortcut_dir("/tmp/tiles")
            .build()
            .unwrap();

        assert!(config.layout_file.is_absolute());
        assert!(config.layout_file.ends_with(LayoutFiles::LAYOUT_FILE_NAME));
        assert!(config.backup_file.ends_with(LayoutFiles::BACKUP_FILE_NAME));
        assert_eq!(config.grid.height, 7);
        assert_eq!(config.timings, SettleTimings::default());
    }

    #[test]
    fn test_default_timings_match_shell_behaviour() {
        let timings = SettleTimings::default();
        assert_eq!(timings.shortcut_registration, Duration::from_secs(8));
        assert_eq!(timings.lock_settle, Duration::from_secs(5));
        assert_eq!(SettleTimings::immediate().lock_settle, Duration::ZERO);
    }
}

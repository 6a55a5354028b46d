//! Derive per-game artifacts and the batched commands that realize them.

use super::artifacts::{LauncherScript, ShortcutArtifact, VisualElementsManifest};
use super::commands::CommandBatch;
use crate::catalog::GameRecord;
use crate::config::{LayoutFiles, TileSize};
use crate::error::{Result, TilesError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Artifacts for every game plus the two command batches.
///
/// Icon downloads and shortcut creation are collected rather than issued one
/// by one, so a run starts at most two processes for them whatever the
/// catalog size.
#[derive(Debug, Clone)]
pub struct ShortcutPlan {
    pub shortcut_dir: PathBuf,
    pub artifacts: Vec<ShortcutArtifact>,
    pub downloads: CommandBatch,
    pub shortcuts: CommandBatch,
}

impl ShortcutPlan {
    /// Plan the shortcuts for `games` inside `start_menu_dir`.
    ///
    /// An icon already present on disk is not downloaded again unless `force`
    /// is set.
    pub fn build(
        games: &[GameRecord],
        start_menu_dir: &Path,
        tile_size: TileSize,
        hide_name: bool,
        force: bool,
        galaxy_client: &Path,
    ) -> Self {
        let icon_dir = start_menu_dir.join(LayoutFiles::VISUAL_ELEMENTS_DIR);
        // Small tiles have no room for a name.
        let show_name = !hide_name && tile_size == TileSize::Medium;

        let mut downloads = CommandBatch::new("icon downloads");
        let mut shortcuts = CommandBatch::new("shortcut creation");
        let mut artifacts = Vec::with_capacity(games.len());

        for game in games {
            let launcher_path = start_menu_dir.join(format!("{}.bat", game.file_safe_key));
            let manifest_path = start_menu_dir.join(format!(
                "{}.VisualElementsManifest.xml",
                game.file_safe_key
            ));
            let icon_path = icon_dir.join(format!(
                "{}{}.png",
                LayoutFiles::ICON_PREFIX,
                game.file_safe_key
            ));
            let shortcut_path = start_menu_dir.join(format!("{}.lnk", game.sanitized_title));

            let downloads_icon = force || !icon_path.exists();
            if downloads_icon {
                downloads.download_icon(&game.icon_reference, &icon_path);
            } else {
                debug!("Icon for {} already cached", game.sanitized_title);
            }
            shortcuts.create_shortcut(&shortcut_path, &launcher_path);

            artifacts.push(ShortcutArtifact {
                release_key: game.release_key.clone(),
                title: game.sanitized_title.clone(),
                launcher_path,
                manifest_path,
                icon_path,
                shortcut_path,
                launcher: LauncherScript {
                    galaxy_client: galaxy_client.to_path_buf(),
                    release_key: game.release_key.clone(),
                },
                manifest: VisualElementsManifest {
                    file_safe_key: game.file_safe_key.clone(),
                    show_name,
                },
                downloads_icon,
            });
        }

        info!(
            "Planned {} shortcuts, {} icon downloads",
            artifacts.len(),
            downloads.len()
        );

        Self {
            shortcut_dir: start_menu_dir.to_path_buf(),
            artifacts,
            downloads,
            shortcuts,
        }
    }

    /// Create the shortcut folder and write every launcher and manifest.
    pub fn write_artifacts(&self) -> Result<()> {
        let icon_dir = self.shortcut_dir.join(LayoutFiles::VISUAL_ELEMENTS_DIR);
        fs::create_dir_all(&icon_dir).map_err(|e| TilesError::Io {
            message: "Error while creating Start Menu folder".to_string(),
            path: Some(icon_dir.clone()),
            source: Some(e),
        })?;

        for artifact in &self.artifacts {
            artifact.write()?;
        }
        Ok(())
    }
}

//! Per-game files placed next to each shortcut.

use crate::config::LayoutFiles;
use crate::error::{Result, TilesError};
use crate::layout::escape_attribute;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tile colours used for every generated manifest.
const FOREGROUND_TEXT: &str = "light";
const BACKGROUND_COLOR: &str = "#5A391B";

/// Batch file that starts a game through the Galaxy client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherScript {
    pub galaxy_client: PathBuf,
    pub release_key: String,
}

impl LauncherScript {
    pub fn content(&self) -> String {
        format!(
            "\"{}\" /command=runGame /gameId={}",
            self.galaxy_client.display(),
            self.release_key
        )
    }
}

/// `VisualElementsManifest.xml` giving the shortcut its tile image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualElementsManifest {
    pub file_safe_key: String,
    /// Overlay the display name on the tile.
    pub show_name: bool,
}

impl VisualElementsManifest {
    /// Logo path relative to the shortcut folder.
    pub fn logo(&self) -> String {
        format!(
            "{}\\{}{}.png",
            LayoutFiles::VISUAL_ELEMENTS_DIR,
            LayoutFiles::ICON_PREFIX,
            self.file_safe_key
        )
    }

    pub fn content(&self) -> String {
        let logo = escape_attribute(&self.logo());
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<Application xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
	<VisualElements ShowNameOnSquare150x150Logo="{}" Square150x150Logo="{logo}" Square70x70Logo="{logo}" ForegroundText="{}" BackgroundColor="{}" />
</Application>"#,
            if self.show_name { "on" } else { "off" },
            FOREGROUND_TEXT,
            BACKGROUND_COLOR,
        )
    }
}

/// Everything needed to realize one game's tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutArtifact {
    pub release_key: String,
    pub title: String,
    /// `<dir>\<fileSafeKey>.bat`
    pub launcher_path: PathBuf,
    /// `<dir>\<fileSafeKey>.VisualElementsManifest.xml`
    pub manifest_path: PathBuf,
    /// `<dir>\VisualElements\MediumIcon<fileSafeKey>.png`
    pub icon_path: PathBuf,
    /// `<dir>\<title>.lnk`
    pub shortcut_path: PathBuf,
    pub launcher: LauncherScript,
    pub manifest: VisualElementsManifest,
    /// Whether an icon download was scheduled.
    pub downloads_icon: bool,
}

impl ShortcutArtifact {
    /// Write the launcher script and the manifest.
    ///
    /// The directory must already exist.
    pub fn write(&self) -> Result<()> {
        write_file(&self.launcher_path, &self.launcher.content())?;
        write_file(&self.manifest_path, &self.manifest.content())?;
        debug!("Wrote launcher and manifest for {}", self.release_key);
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| TilesError::Io {
        message: format!("Could not open or create file '{}'", path.display()),
        path: Some(path.to_path_buf()),
        source: Some(e),
    })
}

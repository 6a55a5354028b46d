//! Platform boundary: command execution, registry access and paths.
//!
//! All `#[cfg]` blocks for OS-specific behavior live in this module. The rest
//! of the crate talks to the host through [`CommandRunner`] and
//! [`ConfigStore`] only.
//!
//! # Supported Platforms
//!
//! - **Windows 10**: Full support
//! - **Everything else**: Planning and artifact generation only; the shell
//!   being configured does not exist there.

pub mod registry;
pub mod runner;

pub use registry::{ConfigStore, ConfigValue};
#[cfg(windows)]
pub use registry::RegistryStore;
pub use runner::{CommandOutput, CommandRunner, PowerShellRunner};

use crate::error::{Result, TilesError};
use std::path::PathBuf;

/// Returns the current platform name.
pub fn current_platform() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "windows"
    }
    #[cfg(target_os = "linux")]
    {
        "linux"
    }
    #[cfg(target_os = "macos")]
    {
        "macos"
    }
    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        "unknown"
    }
}

/// Default folder for game shortcuts.
///
/// `%APPDATA%\Microsoft\Windows\Start Menu\Programs\GOG.com\GameTiles`
pub fn start_menu_tiles_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        TilesError::config("Could not determine app data directory")
    })?;
    Ok(data_dir
        .join("Microsoft")
        .join("Windows")
        .join("Start Menu")
        .join("Programs")
        .join("GOG.com")
        .join("GameTiles"))
}

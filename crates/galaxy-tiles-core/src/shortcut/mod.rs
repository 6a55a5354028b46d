//! Shortcut artifacts for every placed game.
//!
//! Each tile links to a `.lnk` shortcut that starts a `.bat` launcher, with a
//! `VisualElementsManifest.xml` next to it providing the tile image:
//!
//! ```text
//! GameTiles/
//! ├── Alpha.lnk                               -> gog_1.bat
//! ├── gog_1.bat
//! ├── gog_1.VisualElementsManifest.xml
//! └── VisualElements/MediumIcongog_1.png
//! ```

mod artifacts;
mod commands;
mod plan;

pub use artifacts::{LauncherScript, ShortcutArtifact, VisualElementsManifest};
pub use commands::{icon_url, ps_quote, CommandBatch, ShellCommand};
pub use plan::ShortcutPlan;

//! Partial Start layout serialization.
//!
//! See <https://docs.microsoft.com/en-us/windows/configuration/customize-and-export-start-layout#configure-a-partial-start-layout>.
//! Only the groups listed in the document are managed by the shell; the
//! rest of the Start Menu stays under user control.

use super::planner::LayoutDocument;
use crate::error::{Result, TilesError};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

const LAYOUT_HEADER: &str = r#"<LayoutModificationTemplate xmlns:defaultlayout="http://schemas.microsoft.com/Start/2014/FullDefaultLayout" xmlns:start="http://schemas.microsoft.com/Start/2014/StartLayout" Version="1" xmlns="http://schemas.microsoft.com/Start/2014/LayoutModification">
  <LayoutOptions StartTileGroupCellWidth="8" />
  <DefaultLayoutOverride LayoutCustomizationRestrictionType="OnlySpecifiedGroups">
    <StartLayoutCollection>
      <defaultlayout:StartLayout GroupCellWidth="8">"#;

const LAYOUT_FOOTER: &str = r#"
      </defaultlayout:StartLayout>
    </StartLayoutCollection>
  </DefaultLayoutOverride>
</LayoutModificationTemplate>"#;

/// Escape a value for use inside a double-quoted XML attribute.
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Borrowed view rendering a [`LayoutDocument`] as XML.
pub struct LayoutXml<'d, 'a> {
    document: &'d LayoutDocument<'a>,
    shortcut_dir: &'d Path,
}

impl fmt::Display for LayoutXml<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.document.tile_size.cells();

        f.write_str(LAYOUT_HEADER)?;
        for group in &self.document.groups {
            write!(
                f,
                "\n        <start:Group Name=\"{}\">",
                escape_attribute(&group.name)
            )?;
            for tile in &group.tiles {
                let link = self
                    .shortcut_dir
                    .join(format!("{}.lnk", tile.game.sanitized_title));
                write!(
                    f,
                    "\n          <start:DesktopApplicationTile Size=\"{size}x{size}\" Column=\"{}\" Row=\"{}\" DesktopApplicationLinkPath=\"{}\" />",
                    tile.column,
                    tile.row,
                    escape_attribute(&link.display().to_string()),
                )?;
            }
            f.write_str("\n        </start:Group>")?;
        }
        f.write_str(LAYOUT_FOOTER)
    }
}

impl<'a> LayoutDocument<'a> {
    /// Render with tile links pointing into `shortcut_dir`.
    pub fn render<'d>(&'d self, shortcut_dir: &'d Path) -> LayoutXml<'d, 'a> {
        LayoutXml {
            document: self,
            shortcut_dir,
        }
    }

    pub fn to_xml(&self, shortcut_dir: &Path) -> String {
        self.render(shortcut_dir).to_string()
    }

    /// Write the document to `path`, creating parent directories.
    pub fn write_to_file(&self, path: &Path, shortcut_dir: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| TilesError::io_with_path(e, parent))?;
        }

        fs::write(path, self.to_xml(shortcut_dir)).map_err(|e| TilesError::io_with_path(e, path))?;

        debug!("Wrote Start layout to {}", path.display());
        Ok(())
    }
}

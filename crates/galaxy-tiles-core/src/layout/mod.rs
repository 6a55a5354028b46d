//! Tile layout planning and the partial Start layout document.

mod document;
mod planner;

pub use document::{escape_attribute, LayoutXml};
pub use planner::{LayoutDocument, TileGroup, TileLayoutPlanner, TilePlacement};

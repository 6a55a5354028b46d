//! Deterministic packing of games into fixed-size tile groups.

use crate::catalog::GameRecord;
use crate::config::{GridSettings, GridWidth, TileSize};
use tracing::debug;

/// One tile at a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement<'a> {
    pub game: &'a GameRecord,
    /// Column in grid cells.
    pub column: u32,
    /// Row in grid cells.
    pub row: u32,
}

/// A named, capacity-bounded run of tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGroup<'a> {
    pub name: String,
    pub capacity: usize,
    pub tiles: Vec<TilePlacement<'a>>,
}

impl<'a> TileGroup<'a> {
    fn new(name: &str, capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            capacity,
            tiles: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.tiles.len() >= self.capacity
    }
}

/// All groups of one layout, in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDocument<'a> {
    pub tile_size: TileSize,
    pub groups: Vec<TileGroup<'a>>,
}

impl<'a> LayoutDocument<'a> {
    /// Total number of placed tiles.
    pub fn tile_count(&self) -> usize {
        self.groups.iter().map(|g| g.tiles.len()).sum()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &TilePlacement<'a>> {
        self.groups.iter().flat_map(|g| g.tiles.iter())
    }
}

/// Packs games into groups without reordering them.
///
/// Effective width is `width × (3 − tileSize)` tiles; a group holds that many
/// tiles per row for `height × (3 − tileSize)` rows. Full groups are followed
/// by a new group carrying the same name.
#[derive(Debug, Clone)]
pub struct TileLayoutPlanner {
    group_name: String,
    tile_size: TileSize,
    width: GridWidth,
    height: u32,
}

impl TileLayoutPlanner {
    pub fn new(group_name: impl Into<String>, tile_size: TileSize, width: GridWidth, height: u32) -> Self {
        Self {
            group_name: group_name.into(),
            tile_size,
            width,
            height,
        }
    }

    pub fn from_settings(settings: &GridSettings) -> Self {
        Self::new(
            settings.group_name.clone(),
            settings.tile_size,
            settings.width,
            settings.height,
        )
    }

    /// Tiles per row.
    pub fn effective_width(&self) -> u32 {
        self.width.value() * self.tile_size.scale()
    }

    /// Tile rows per group.
    pub fn effective_height(&self) -> u32 {
        self.height.saturating_mul(self.tile_size.scale())
    }

    /// Tiles per group.
    pub fn capacity(&self) -> usize {
        (self.effective_width() as usize).saturating_mul(self.effective_height() as usize)
    }

    /// Grid cell of the `index`-th tile within a group.
    pub fn cell(&self, index: usize) -> (u32, u32) {
        let width = self.effective_width() as usize;
        let size = self.tile_size.cells();
        let column = (index % width) as u32 * size;
        let row = (index / width) as u32 * size;
        (column, row)
    }

    /// Place `games` in order.
    pub fn plan<'a>(&self, games: &'a [GameRecord]) -> LayoutDocument<'a> {
        let capacity = self.capacity();
        let mut groups = vec![TileGroup::new(&self.group_name, capacity)];

        for game in games {
            if groups.last().map_or(true, TileGroup::is_full) {
                groups.push(TileGroup::new(&self.group_name, capacity));
            }
            if let Some(group) = groups.last_mut() {
                let (column, row) = self.cell(group.tiles.len());
                group.tiles.push(TilePlacement { game, column, row });
            }
        }

        debug!(
            "Planned {} tiles into {} groups of up to {} tiles",
            games.len(),
            groups.len(),
            capacity
        );

        LayoutDocument {
            tile_size: self.tile_size,
            groups,
        }
    }
}

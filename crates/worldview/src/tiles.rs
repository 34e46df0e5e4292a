use std::collections::BTreeMap;

use crate::layers::{DepthLayerStack, LayerId};
use crate::view_model::{TileInfo, TileVisual};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedTile {
    pub depth: i32,
    pub visual: TileVisual,
    parent: Option<LayerId>,
}

impl TrackedTile {
    pub fn parent(&self) -> Option<LayerId> {
        self.parent
    }
}

/// Visible tile cells and the tile layer each one is currently drawn in.
#[derive(Debug, Default)]
pub struct TileCells {
    cells: BTreeMap<(u32, u32), TrackedTile>,
}

impl TileCells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, info: TileInfo, stack: &mut DepthLayerStack) {
        let cell = (info.x, info.y);
        let previous = self.cells.insert(
            cell,
            TrackedTile {
                depth: info.depth,
                visual: info.visual,
                parent: None,
            },
        );
        if let Some(layer) = previous
            .and_then(|tile| tile.parent)
            .and_then(|parent| stack.tile_layer_mut_by_id(parent))
        {
            layer.remove(info.x, info.y);
        }
        Self::insert_into_layer(cell, self.cells.get_mut(&cell), stack);
    }

    /// Re-places every cell, e.g. into a freshly rebuilt stack.
    pub fn place_all(&mut self, stack: &mut DepthLayerStack) {
        for (cell, tile) in self.cells.iter_mut() {
            if let Some(layer) = tile
                .parent
                .and_then(|parent| stack.tile_layer_mut_by_id(parent))
            {
                layer.remove(cell.0, cell.1);
            }
            tile.parent = None;
            Self::insert_into_layer(*cell, Some(tile), stack);
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&TrackedTile> {
        self.cells.get(&(x, y))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn insert_into_layer(
        cell: (u32, u32),
        tile: Option<&mut TrackedTile>,
        stack: &mut DepthLayerStack,
    ) {
        let Some(tile) = tile else {
            return;
        };
        let Some(pair) = stack.pair_mut(tile.depth) else {
            return;
        };
        pair.tile.insert(cell.0, cell.1, tile.visual);
        tile.parent = Some(pair.tile.id());
    }
}

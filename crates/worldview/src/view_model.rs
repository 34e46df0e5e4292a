use thiserror::Error;

use crate::coords::{CoordinateBridge, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileVisual {
    pub color: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteVisual {
    pub color: [u8; 4],
    pub half_size_px: u32,
}

/// One visible tile cell. `depth` is the visible Z expressed as distance behind the front slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileInfo {
    pub x: u32,
    pub y: u32,
    pub depth: i32,
    pub visual: TileVisual,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteInfo {
    pub id: SpriteId,
    pub depth: i32,
    pub screen: Vec2,
    pub visual: SpriteVisual,
}

/// Change notifications pushed by the view-model, delivered in order on the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewModelEvent {
    TileVisibilityChanged(TileInfo),
    SpriteAppeared(SpriteInfo),
    SpriteDepthChanged { id: SpriteId, depth: i32 },
    SpriteMoved { id: SpriteId, screen: Vec2 },
    SpriteRemoved(SpriteId),
    MaxZLevelChanged,
    TileOffsetChanged { x: i32, y: i32 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("view model rejected {operation}: {reason}")]
    ViewModel {
        operation: &'static str,
        reason: String,
    },
    #[error("input handler rejected {operation}: {reason}")]
    InputHandler {
        operation: &'static str,
        reason: String,
    },
}

/// The world state the view presents. Owns tiles, sprites, origin and Z levels.
pub trait ViewModel: CoordinateBridge {
    fn view_width(&self) -> u32;
    fn view_height(&self) -> u32;
    fn max_z_level(&self) -> i32;
    fn current_z_level(&self) -> i32;
    fn tile_offset(&self) -> (i32, i32);
    fn visible_tile_count(&self) -> (u32, u32);
    fn visible_tile(&self, x: u32, y: u32) -> Option<TileInfo>;
    fn visible_sprites(&self) -> Vec<SpriteInfo>;
    fn move_origin(&mut self, dx: f32, dy: f32) -> Result<(), CollaboratorError>;
    fn adjust_level(&mut self, delta: i32) -> Result<(), CollaboratorError>;

    /// Drains notifications queued since the last call.
    fn take_notifications(&mut self) -> Vec<ViewModelEvent> {
        Vec::new()
    }
}

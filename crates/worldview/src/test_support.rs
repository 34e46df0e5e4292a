use std::cell::RefCell;
use std::rc::Rc;

use crate::coords::{CoordinateBridge, TileViewport};
use crate::input::PointerEvent;
use crate::input_handler::{UserInputHandler, WorldRegion};
use crate::view_model::{
    CollaboratorError, SpriteId, SpriteInfo, TileInfo, ViewModel, ViewModelEvent,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ViewModelCall {
    MoveOrigin { dx: f32, dy: f32 },
    AdjustLevel { delta: i32 },
}

pub(crate) struct RecordingViewModel {
    pub viewport: TileViewport,
    pub view_size: (u32, u32),
    pub max_z_level: i32,
    pub visible_tiles: (u32, u32),
    pub tiles: Vec<TileInfo>,
    pub sprites: Vec<SpriteInfo>,
    pub pending: Vec<ViewModelEvent>,
    pub calls: Vec<ViewModelCall>,
    pub fail_with: Option<String>,
}

impl RecordingViewModel {
    pub fn new(pixels_per_tile: u32, current_z_level: i32) -> Self {
        Self {
            viewport: TileViewport::new(pixels_per_tile, current_z_level),
            view_size: (320, 240),
            max_z_level: 2,
            visible_tiles: (4, 3),
            tiles: Vec::new(),
            sprites: Vec::new(),
            pending: Vec::new(),
            calls: Vec::new(),
            fail_with: None,
        }
    }

    fn check(&self, operation: &'static str) -> Result<(), CollaboratorError> {
        match &self.fail_with {
            Some(reason) => Err(CollaboratorError::ViewModel {
                operation,
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl CoordinateBridge for RecordingViewModel {
    fn pixels_per_tile(&self) -> u32 {
        self.viewport.pixels_per_tile()
    }

    fn screen_to_world_x(&self, screen_x: f32) -> f32 {
        self.viewport.screen_to_world_x(screen_x)
    }

    fn screen_to_world_y(&self, screen_y: f32) -> f32 {
        self.viewport.screen_to_world_y(screen_y)
    }

    fn screen_to_world_z(&self, screen_x: f32, screen_y: f32) -> i32 {
        self.viewport.screen_to_world_z(screen_x, screen_y)
    }

    fn world_to_screen_x(&self, world_x: f32) -> f32 {
        self.viewport.world_to_screen_x(world_x)
    }

    fn world_to_screen_y(&self, world_y: f32) -> f32 {
        self.viewport.world_to_screen_y(world_y)
    }
}

impl ViewModel for RecordingViewModel {
    fn view_width(&self) -> u32 {
        self.view_size.0
    }

    fn view_height(&self) -> u32 {
        self.view_size.1
    }

    fn max_z_level(&self) -> i32 {
        self.max_z_level
    }

    fn current_z_level(&self) -> i32 {
        self.viewport.current_z_level()
    }

    fn tile_offset(&self) -> (i32, i32) {
        self.viewport.tile_offset()
    }

    fn visible_tile_count(&self) -> (u32, u32) {
        self.visible_tiles
    }

    fn visible_tile(&self, x: u32, y: u32) -> Option<TileInfo> {
        self.tiles
            .iter()
            .find(|tile| tile.x == x && tile.y == y)
            .copied()
    }

    fn visible_sprites(&self) -> Vec<SpriteInfo> {
        self.sprites.clone()
    }

    fn move_origin(&mut self, dx: f32, dy: f32) -> Result<(), CollaboratorError> {
        self.check("move_origin")?;
        self.calls.push(ViewModelCall::MoveOrigin { dx, dy });
        self.viewport.move_origin(dx, dy);
        Ok(())
    }

    fn adjust_level(&mut self, delta: i32) -> Result<(), CollaboratorError> {
        self.check("adjust_level")?;
        self.calls.push(ViewModelCall::AdjustLevel { delta });
        Ok(())
    }

    fn take_notifications(&mut self) -> Vec<ViewModelEvent> {
        std::mem::take(&mut self.pending)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HandlerCall {
    WorldPoint { x: f32, y: f32, z: i32 },
    Region(WorldRegion),
    Object(SpriteId),
}

/// Input handler whose call log stays readable after it is boxed into a view.
#[derive(Clone, Default)]
pub(crate) struct RecordingInputHandler {
    pub calls: Rc<RefCell<Vec<HandlerCall>>>,
    pub fail_with: Option<String>,
}

impl RecordingInputHandler {
    fn record(&self, operation: &'static str, call: HandlerCall) -> Result<(), CollaboratorError> {
        if let Some(reason) = &self.fail_with {
            return Err(CollaboratorError::InputHandler {
                operation,
                reason: reason.clone(),
            });
        }
        self.calls.borrow_mut().push(call);
        Ok(())
    }
}

impl UserInputHandler for RecordingInputHandler {
    fn world_point_clicked(
        &mut self,
        x: f32,
        y: f32,
        z: i32,
        _raw: &PointerEvent,
    ) -> Result<(), CollaboratorError> {
        self.record("world_point_clicked", HandlerCall::WorldPoint { x, y, z })
    }

    fn region_selected(
        &mut self,
        region: WorldRegion,
        _raw: &PointerEvent,
    ) -> Result<(), CollaboratorError> {
        self.record("region_selected", HandlerCall::Region(region))
    }

    fn object_clicked(
        &mut self,
        sprite: SpriteId,
        _raw: &PointerEvent,
    ) -> Result<(), CollaboratorError> {
        self.record("object_clicked", HandlerCall::Object(sprite))
    }
}

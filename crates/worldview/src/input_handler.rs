use crate::input::PointerEvent;
use crate::view_model::{CollaboratorError, SpriteId};

/// World-space region spanned by a marquee. `z_max` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRegion {
    pub x_min: f32,
    pub y_min: f32,
    pub z_min: i32,
    pub x_max: f32,
    pub y_max: f32,
    pub z_max: i32,
}

/// Receives the semantic events produced from pointer input.
pub trait UserInputHandler {
    fn world_point_clicked(
        &mut self,
        x: f32,
        y: f32,
        z: i32,
        raw: &PointerEvent,
    ) -> Result<(), CollaboratorError>;

    fn region_selected(
        &mut self,
        region: WorldRegion,
        raw: &PointerEvent,
    ) -> Result<(), CollaboratorError>;

    fn object_clicked(&mut self, sprite: SpriteId, raw: &PointerEvent)
        -> Result<(), CollaboratorError>;
}

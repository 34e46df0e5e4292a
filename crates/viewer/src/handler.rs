use tracing::{debug, info};
use worldview::{CollaboratorError, PointerEvent, SpriteId, UserInputHandler, WorldRegion};

/// Reports picks to the log and remembers the most recent one.
#[derive(Debug, Default)]
pub struct LoggingInputHandler {
    picks: u64,
    last_pick: Option<Pick>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Pick {
    Point { x: f32, y: f32, z: i32 },
    Region(WorldRegion),
    Object(SpriteId),
}

impl LoggingInputHandler {
    fn record(&mut self, pick: Pick) {
        self.picks = self.picks.saturating_add(1);
        self.last_pick = Some(pick);
        debug!(picks = self.picks, last_pick = ?self.last_pick, "pick_recorded");
    }
}

impl UserInputHandler for LoggingInputHandler {
    fn world_point_clicked(
        &mut self,
        x: f32,
        y: f32,
        z: i32,
        raw: &PointerEvent,
    ) -> Result<(), CollaboratorError> {
        info!(x, y, z, button = ?raw.button, "world_point_clicked");
        self.record(Pick::Point { x, y, z });
        Ok(())
    }

    fn region_selected(
        &mut self,
        region: WorldRegion,
        raw: &PointerEvent,
    ) -> Result<(), CollaboratorError> {
        info!(
            x_min = region.x_min,
            y_min = region.y_min,
            z_min = region.z_min,
            x_max = region.x_max,
            y_max = region.y_max,
            z_max = region.z_max,
            shift = raw.shift_down,
            "region_selected"
        );
        self.record(Pick::Region(region));
        Ok(())
    }

    fn object_clicked(
        &mut self,
        sprite: SpriteId,
        raw: &PointerEvent,
    ) -> Result<(), CollaboratorError> {
        info!(sprite = sprite.0, button = ?raw.button, "object_clicked");
        self.record(Pick::Object(sprite));
        Ok(())
    }
}

use tracing::{debug, info, warn};

use crate::config::ViewOptions;
use crate::grid::GridOverlay;
use crate::input::{
    EventDisposition, InputState, PointerButton, PointerEvent, PointerEventKind, ScrollEvent,
    SelectionRect, ViewCommand, ViewportInputController,
};
use crate::input_handler::UserInputHandler;
use crate::layers::{effective_max_depth, DepthLayerStack, LayerId};
use crate::sprites::SpriteDepthRouter;
use crate::tiles::TileCells;
use crate::view_model::{CollaboratorError, SpriteId, ViewModel, ViewModelEvent};

/// One entry of the root container's back-to-front paint list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintItem {
    TileLayer(LayerId),
    SpriteLayer(LayerId),
    Grid,
    Selection,
}

/// Layered presentation of a view-model: depth layers, sprite routing, grid and pointer input.
///
/// All mutation happens through `&mut self` on the UI thread, so a layer rebuild is never
/// observable half done.
pub struct WorldView<VM: ViewModel> {
    view_model: VM,
    options: ViewOptions,
    layers: DepthLayerStack,
    tiles: TileCells,
    sprites: SpriteDepthRouter,
    controller: ViewportInputController,
    grid: Option<GridOverlay>,
    input_handler: Option<Box<dyn UserInputHandler>>,
}

impl<VM: ViewModel> WorldView<VM> {
    pub fn create(view_model: VM, options: ViewOptions) -> Self {
        let max_depth = effective_max_depth(view_model.max_z_level(), options.show_underlying);
        let layers = DepthLayerStack::initialize(max_depth, &options);
        let grid = build_grid(&view_model, &options);
        let mut view = Self {
            view_model,
            options,
            layers,
            tiles: TileCells::new(),
            sprites: SpriteDepthRouter::new(),
            controller: ViewportInputController::new(options.reverse_scroll_enabled),
            grid,
            input_handler: None,
        };
        view.populate_from_view_model();
        info!(
            max_depth,
            tiles = view.tiles.len(),
            sprites = view.sprites.len(),
            grid = view.grid.is_some(),
            "world_view_created"
        );
        view
    }

    fn populate_from_view_model(&mut self) {
        // Anything queued before creation is superseded by the full scan below.
        self.view_model.take_notifications();

        let (tiles_x, tiles_y) = self.view_model.visible_tile_count();
        for x in 0..tiles_x {
            for y in 0..tiles_y {
                if let Some(tile) = self.view_model.visible_tile(x, y) {
                    self.tiles.place(tile, &mut self.layers);
                }
            }
        }
        for sprite in self.view_model.visible_sprites() {
            self.sprites.attach(sprite, &mut self.layers);
        }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn view_model(&self) -> &VM {
        &self.view_model
    }

    /// Direct access for driving the model. Call [`Self::pump_notifications`] afterwards.
    pub fn view_model_mut(&mut self) -> &mut VM {
        &mut self.view_model
    }

    pub fn set_user_input_handler(&mut self, handler: Box<dyn UserInputHandler>) {
        self.input_handler = Some(handler);
    }

    pub fn has_user_input_handler(&self) -> bool {
        self.input_handler.is_some()
    }

    /// Size of the root container; it always matches the view-model's viewport.
    pub fn root_size(&self) -> (u32, u32) {
        (self.view_model.view_width(), self.view_model.view_height())
    }

    pub fn layers(&self) -> &DepthLayerStack {
        &self.layers
    }

    pub fn sprites(&self) -> &SpriteDepthRouter {
        &self.sprites
    }

    pub fn tiles(&self) -> &TileCells {
        &self.tiles
    }

    pub fn grid(&self) -> Option<&GridOverlay> {
        self.grid.as_ref()
    }

    pub fn input_state(&self) -> &InputState {
        self.controller.state()
    }

    pub fn selection_rect(&self) -> Option<SelectionRect> {
        self.controller.selection_rect()
    }

    pub fn max_depth(&self) -> u32 {
        self.layers.max_depth()
    }

    /// Back to front. The grid sits between the front tile layer and the front sprite layer.
    pub fn paint_order(&self) -> Vec<PaintItem> {
        let mut items = Vec::with_capacity(self.layers.len() * 2 + 2);
        for pair in self.layers.back_to_front() {
            items.push(PaintItem::TileLayer(pair.tile.id()));
            if pair.depth() == 0 && self.grid.is_some() {
                items.push(PaintItem::Grid);
            }
            items.push(PaintItem::SpriteLayer(pair.sprite.id()));
        }
        items.push(PaintItem::Selection);
        items
    }

    /// Rebuilds the layer stack when the effective max depth changed. Returns whether it did.
    pub fn recompute_max_depth(&mut self) -> bool {
        let max_depth = effective_max_depth(
            self.view_model.max_z_level(),
            self.options.show_underlying,
        );
        if max_depth == self.layers.max_depth() {
            return false;
        }
        self.rebuild_layers(max_depth);
        true
    }

    fn rebuild_layers(&mut self, max_depth: u32) {
        let previous = self.layers.max_depth();
        let mut next = self.layers.rebuilt(max_depth, &self.options);
        self.tiles.place_all(&mut next);
        self.sprites.reroute_all(&mut next);
        self.layers = next;
        info!(
            previous_max_depth = previous,
            max_depth,
            generation = self.layers.generation(),
            "layer_stack_rebuilt"
        );
    }

    pub fn set_show_underlying(&mut self, show_underlying: Option<u32>) {
        self.options.show_underlying = show_underlying;
        self.recompute_max_depth();
    }

    /// Re-reads every flag: effects, grid, scroll direction and the show-underlying override.
    pub fn apply_options(&mut self, options: ViewOptions) {
        let previous = self.options;
        self.options = options;
        self.controller.set_reverse_scroll(options.reverse_scroll_enabled);

        let grid_changed = previous.grid_enabled != options.grid_enabled
            || previous.grid_coordinates_enabled != options.grid_coordinates_enabled;
        if grid_changed {
            self.grid = build_grid(&self.view_model, &options);
        }
        if !self.recompute_max_depth() {
            self.layers.apply_effects(&options);
        }
        info!(options = ?options, "view_options_applied");
    }

    /// Drains and applies the view-model's queued notifications. Returns how many were handled.
    pub fn pump_notifications(&mut self) -> usize {
        let events = self.view_model.take_notifications();
        let count = events.len();
        for event in events {
            self.handle_view_model_event(event);
        }
        count
    }

    pub fn handle_view_model_event(&mut self, event: ViewModelEvent) {
        match event {
            ViewModelEvent::TileVisibilityChanged(tile) => {
                self.tiles.place(tile, &mut self.layers);
            }
            ViewModelEvent::SpriteAppeared(sprite) => {
                self.sprites.attach(sprite, &mut self.layers);
            }
            ViewModelEvent::SpriteDepthChanged { id, depth } => {
                if self.sprites.set_depth(id, depth, &mut self.layers).is_none() {
                    warn!(sprite = id.0, depth, "depth_change_for_unknown_sprite");
                }
            }
            ViewModelEvent::SpriteMoved { id, screen } => {
                if !self.sprites.set_screen_position(id, screen) {
                    warn!(sprite = id.0, "move_for_unknown_sprite");
                }
            }
            ViewModelEvent::SpriteRemoved(id) => {
                if !self.sprites.detach(id, &mut self.layers) {
                    warn!(sprite = id.0, "removal_of_unknown_sprite");
                }
            }
            ViewModelEvent::MaxZLevelChanged => {
                self.recompute_max_depth();
            }
            ViewModelEvent::TileOffsetChanged { x, y } => {
                if let Some(grid) = self.grid.as_mut() {
                    grid.on_tile_offset_changed(x, y);
                }
            }
        }
    }

    pub fn handle_pointer(
        &mut self,
        event: &PointerEvent,
    ) -> Result<EventDisposition, CollaboratorError> {
        if event.kind == PointerEventKind::Click && event.button == PointerButton::Primary {
            let target = self
                .sprites
                .hit_test(event.position, &self.layers)
                .and_then(|hit| self.sprites.object_click_target(hit));
            if let Some(sprite) = target {
                self.dispatch_object_click(sprite, event)?;
                return Ok(EventDisposition::Consumed);
            }
        }

        let outcome = self.controller.handle_pointer(event, &self.view_model);
        if let Some(command) = outcome.command {
            self.execute(command, event)?;
        }
        Ok(outcome.disposition)
    }

    pub fn handle_scroll(
        &mut self,
        event: &ScrollEvent,
    ) -> Result<EventDisposition, CollaboratorError> {
        let outcome = self.controller.handle_scroll(event);
        match outcome.command {
            Some(ViewCommand::MoveOrigin { dx, dy }) => self.move_origin(dx, dy)?,
            Some(ViewCommand::AdjustLevel { delta }) => self.adjust_level(delta)?,
            Some(other) => debug!(command = ?other, "scroll_command_ignored"),
            None => {}
        }
        Ok(outcome.disposition)
    }

    fn execute(
        &mut self,
        command: ViewCommand,
        raw: &PointerEvent,
    ) -> Result<(), CollaboratorError> {
        match command {
            ViewCommand::MoveOrigin { dx, dy } => self.move_origin(dx, dy)?,
            ViewCommand::AdjustLevel { delta } => self.adjust_level(delta)?,
            ViewCommand::WorldPointClicked { x, y, z } => match self.input_handler.as_mut() {
                Some(handler) => handler.world_point_clicked(x, y, z, raw)?,
                None => warn!(x, y, z, "world_point_clicked_without_handler"),
            },
            ViewCommand::RegionSelected(region) => match self.input_handler.as_mut() {
                Some(handler) => handler.region_selected(region, raw)?,
                None => warn!(region = ?region, "region_selected_without_handler"),
            },
        }
        Ok(())
    }

    fn move_origin(&mut self, dx: f32, dy: f32) -> Result<(), CollaboratorError> {
        self.view_model.move_origin(dx, dy)?;
        self.pump_notifications();
        Ok(())
    }

    fn adjust_level(&mut self, delta: i32) -> Result<(), CollaboratorError> {
        self.view_model.adjust_level(delta)?;
        debug!(delta, "level_adjusted");
        self.pump_notifications();
        Ok(())
    }

    fn dispatch_object_click(
        &mut self,
        sprite: SpriteId,
        raw: &PointerEvent,
    ) -> Result<(), CollaboratorError> {
        match self.input_handler.as_mut() {
            Some(handler) => handler.object_clicked(sprite, raw),
            None => {
                warn!(sprite = sprite.0, "object_clicked_without_handler");
                Ok(())
            }
        }
    }
}

fn build_grid<VM: ViewModel>(view_model: &VM, options: &ViewOptions) -> Option<GridOverlay> {
    if !options.grid_enabled {
        return None;
    }
    let (tiles_x, tiles_y) = view_model.visible_tile_count();
    Some(GridOverlay::build(
        tiles_x,
        tiles_y,
        view_model.pixels_per_tile(),
        options.grid_coordinates_enabled,
        view_model.tile_offset(),
    ))
}

#[cfg(test)]
mod tests;

pub mod app;
pub mod config;
pub mod coords;
pub mod grid;
pub mod input;
pub mod input_handler;
pub mod layers;
pub mod sprites;
pub mod tiles;
pub mod view;
pub mod view_model;

#[cfg(test)]
mod test_support;

pub use app::{run_app, AppError, LoopConfig, Simulation};
pub use config::{OptionsError, ViewOptions, OPTIONS_ENV_VAR};
pub use coords::{CoordinateBridge, ScreenRect, TileViewport, Vec2};
pub use grid::{GridLabel, GridLine, GridOverlay};
pub use input::{
    EventDisposition, InputOutcome, InputState, PointerButton, PointerEvent, PointerEventKind,
    ScrollEvent, SelectionRect, ViewCommand, ViewportInputController,
};
pub use input_handler::{UserInputHandler, WorldRegion};
pub use layers::{
    effective_max_depth, DepthLayerStack, LayerEffect, LayerId, LayerKind, MAX_LAYER_DEPTH,
};
pub use sprites::{Placement, SpriteDepthRouter};
pub use tiles::TileCells;
pub use view::{PaintItem, WorldView};
pub use view_model::{
    CollaboratorError, SpriteId, SpriteInfo, SpriteVisual, TileInfo, TileVisual, ViewModel,
    ViewModelEvent,
};

mod input;
mod loop_runner;
mod rendering;

pub use input::{
    next_show_underlying, pointer_button, PointerTranslator, CLICK_SLOP_PX, LINE_SCROLL_PX,
};
pub use loop_runner::{run_app, AppError, LoopConfig, Simulation};
pub use rendering::{apply_effect, Compositor, LayerCanvas, Renderer, BACKGROUND_COLOR};

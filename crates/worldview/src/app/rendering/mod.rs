mod compositor;
mod glyphs;
mod renderer;

pub use compositor::{apply_effect, Compositor, LayerCanvas, BACKGROUND_COLOR};
pub use renderer::Renderer;

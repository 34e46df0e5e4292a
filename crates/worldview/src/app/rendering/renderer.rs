use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use winit::window::Window;

use crate::coords::Vec2;
use crate::view::WorldView;
use crate::view_model::ViewModel;

use super::compositor::Compositor;

/// Presents a fixed-size pixel buffer matching the view's root size, scaled into the window.
pub struct Renderer {
    pixels: Pixels<'static>,
    buffer_width: u32,
    buffer_height: u32,
    compositor: Compositor,
}

impl Renderer {
    pub fn new(window: Arc<Window>, buffer_width: u32, buffer_height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, window);
        let pixels = Pixels::new(buffer_width.max(1), buffer_height.max(1), surface)?;
        Ok(Self {
            pixels,
            buffer_width: buffer_width.max(1),
            buffer_height: buffer_height.max(1),
            compositor: Compositor::new(),
        })
    }

    pub fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    /// Follows a change of the view's root size.
    pub fn resize_buffer(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 || (width, height) == (self.buffer_width, self.buffer_height)
        {
            return Ok(());
        }
        self.pixels.resize_buffer(width, height)?;
        self.buffer_width = width;
        self.buffer_height = height;
        Ok(())
    }

    /// Maps a physical window position to view pixels, clamping positions outside the buffer.
    pub fn window_to_view(&self, x: f64, y: f64) -> Vec2 {
        let (px, py) = match self.pixels.window_pos_to_pixel((x as f32, y as f32)) {
            Ok(inside) => inside,
            Err(outside) => self.pixels.clamp_pixel_pos(outside),
        };
        Vec2::new(px as f32, py as f32)
    }

    pub fn render<VM: ViewModel>(&mut self, view: &WorldView<VM>) -> Result<(), Error> {
        let (width, height) = (self.buffer_width, self.buffer_height);
        self.compositor
            .compose(view, self.pixels.frame_mut(), width, height);
        self.pixels.render()
    }
}


use crate::coords::ScreenRect;
use crate::grid::GridOverlay;
use crate::layers::{LayerEffect, LayerId, LayerPair, SpriteLayer, TileLayer};
use crate::sprites::SpriteDepthRouter;
use crate::view::{PaintItem, WorldView};
use crate::view_model::ViewModel;

use super::glyphs::for_each_text_pixel;

pub const BACKGROUND_COLOR: [u8; 4] = [18, 20, 26, 255];
const GRID_LINE_COLOR: [u8; 4] = [239, 222, 205, 90];
const GRID_LABEL_COLOR: [u8; 4] = [239, 222, 205, 220];
const GRID_LABEL_INSET_PX: i32 = 2;
const SELECTION_FILL_COLOR: [u8; 4] = [100, 149, 237, 64];
const SELECTION_STROKE_COLOR: [u8; 4] = [100, 149, 237, 255];
const SHADOW_BLUR_PASSES: u32 = 3;

/// Premultiplied RGBA surface one layer is painted into before its effect runs.
#[derive(Debug, Clone, Default)]
pub struct LayerCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl LayerCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        let mut canvas = Self::default();
        canvas.resize(width, height);
        canvas
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize * 4, 0);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Premultiplied value at `(x, y)`; transparent outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[offset..offset + 4]);
        out
    }

    /// Source-over fill of a straight-alpha color, clipped to the canvas.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: [u8; 4]) {
        let source = premultiply(color);
        let canvas_width = self.width as usize;
        for_each_clipped(x, y, width, height, self.width, self.height, |px, py| {
            let offset = (py * canvas_width + px) * 4;
            blend_over(&mut self.pixels[offset..offset + 4], source);
        });
    }

    fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|pixel| pixel[3] == 0)
    }
}

/// Paints the view's back-to-front item list onto an opaque RGBA frame.
#[derive(Debug, Default)]
pub struct Compositor {
    canvas: LayerCanvas,
    pass: Vec<u8>,
    shadow: Vec<u8>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compose<VM: ViewModel>(
        &mut self,
        view: &WorldView<VM>,
        frame: &mut [u8],
        width: u32,
        height: u32,
    ) {
        if width == 0 || height == 0 {
            return;
        }
        for pixel in frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&BACKGROUND_COLOR);
        }
        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas.resize(width, height);
        }

        let pixels_per_tile = view.view_model().pixels_per_tile() as i32;
        for item in view.paint_order() {
            match item {
                PaintItem::TileLayer(id) => {
                    let Some(pair) = pair_for(view, id) else {
                        continue;
                    };
                    if pair.tile.is_empty() {
                        continue;
                    }
                    self.canvas.clear();
                    paint_tiles(&mut self.canvas, &pair.tile, pixels_per_tile);
                    self.finish_layer(pair.tile.effect().map(|effect| &**effect), frame);
                }
                PaintItem::SpriteLayer(id) => {
                    let Some(pair) = pair_for(view, id) else {
                        continue;
                    };
                    if pair.sprite.is_empty() {
                        continue;
                    }
                    self.canvas.clear();
                    paint_sprites(&mut self.canvas, &pair.sprite, view.sprites());
                    self.finish_layer(pair.sprite.effect().map(|effect| &**effect), frame);
                }
                PaintItem::Grid => {
                    if let Some(grid) = view.grid() {
                        draw_grid(frame, width, height, grid);
                    }
                }
                PaintItem::Selection => {
                    if let Some(rect) = view.selection_rect().filter(|rect| rect.visible) {
                        draw_selection(frame, width, height, &rect.bounds);
                    }
                }
            }
        }
    }

    fn finish_layer(&mut self, effect: Option<&LayerEffect>, frame: &mut [u8]) {
        if let Some(effect) = effect {
            apply_effect(&mut self.canvas, effect, &mut self.pass, &mut self.shadow);
        }
        if !self.canvas.is_blank() {
            composite_onto(frame, &self.canvas);
        }
    }
}

fn pair_for<VM: ViewModel>(view: &WorldView<VM>, id: LayerId) -> Option<&LayerPair> {
    let pair = view.layers().pair(i32::try_from(id.depth).ok()?)?;
    (pair.tile.id() == id || pair.sprite.id() == id).then_some(pair)
}

fn paint_tiles(canvas: &mut LayerCanvas, layer: &TileLayer, pixels_per_tile: i32) {
    for ((x, y), visual) in layer.tiles() {
        canvas.fill_rect(
            x as i32 * pixels_per_tile,
            y as i32 * pixels_per_tile,
            pixels_per_tile,
            pixels_per_tile,
            visual.color,
        );
    }
}

fn paint_sprites(canvas: &mut LayerCanvas, layer: &SpriteLayer, sprites: &SpriteDepthRouter) {
    for id in layer.sprites() {
        let Some(sprite) = sprites.get(*id) else {
            continue;
        };
        let half = sprite.visual.half_size_px as i32;
        let cx = sprite.screen.x.round() as i32;
        let cy = sprite.screen.y.round() as i32;
        canvas.fill_rect(cx - half, cy - half, half * 2 + 1, half * 2 + 1, sprite.visual.color);
    }
}

/// Runs every stage of `effect` on `canvas` in application order.
pub fn apply_effect(
    canvas: &mut LayerCanvas,
    effect: &LayerEffect,
    pass: &mut Vec<u8>,
    shadow: &mut Vec<u8>,
) {
    let (width, height) = (canvas.width as usize, canvas.height as usize);
    for stage in effect.stages() {
        match stage {
            LayerEffect::Darken { brightness } => darken(&mut canvas.pixels, *brightness),
            LayerEffect::Blur { radius, iterations } => box_blur(
                &mut canvas.pixels,
                width,
                height,
                blur_half_width(*radius),
                *iterations,
                pass,
            ),
            LayerEffect::DropShadow { radius, color } => {
                shadow.clear();
                shadow.extend(canvas.pixels.chunks_exact(4).flat_map(|pixel| {
                    let coverage = mul_div255(color[3], pixel[3]);
                    [
                        mul_div255(color[0], coverage),
                        mul_div255(color[1], coverage),
                        mul_div255(color[2], coverage),
                        coverage,
                    ]
                }));
                let half = (*radius / 3.0).round().max(0.0) as usize;
                box_blur(shadow, width, height, half, SHADOW_BLUR_PASSES, pass);
                for (content, shade) in canvas.pixels.chunks_exact_mut(4).zip(shadow.chunks_exact(4))
                {
                    let uncovered = 255 - content[3];
                    for channel in 0..4 {
                        content[channel] =
                            content[channel].saturating_add(mul_div255(shade[channel], uncovered));
                    }
                }
            }
            // `stages` already flattened nested compositions.
            LayerEffect::Compose { .. } => {}
        }
    }
}

/// Box kernel half width for a blur of total width `radius`.
fn blur_half_width(radius: f32) -> usize {
    ((radius - 1.0) / 2.0).round().max(0.0) as usize
}

fn darken(pixels: &mut [u8], brightness: f32) {
    let factor = (1.0 + brightness).clamp(0.0, 1.0);
    for pixel in pixels.chunks_exact_mut(4) {
        for channel in &mut pixel[..3] {
            *channel = (*channel as f32 * factor).round() as u8;
        }
    }
}

/// Separable box blur over premultiplied RGBA. Pixels outside the surface count as transparent.
fn box_blur(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    half: usize,
    iterations: u32,
    pass: &mut Vec<u8>,
) {
    if half == 0 || width == 0 || height == 0 {
        return;
    }
    pass.clear();
    pass.resize(pixels.len(), 0);
    for _ in 0..iterations {
        blur_lines(pixels, pass, width, height, half, true);
        blur_lines(pass, pixels, width, height, half, false);
    }
}

fn blur_lines(
    source: &[u8],
    target: &mut [u8],
    width: usize,
    height: usize,
    half: usize,
    horizontal: bool,
) {
    let (lines, length) = if horizontal {
        (height, width)
    } else {
        (width, height)
    };
    let offset = |line: usize, index: usize| {
        if horizontal {
            (line * width + index) * 4
        } else {
            (index * width + line) * 4
        }
    };
    let window = (half * 2 + 1) as u32;
    for line in 0..lines {
        for channel in 0..4 {
            let mut sum = 0u32;
            for index in 0..=half.min(length - 1) {
                sum += u32::from(source[offset(line, index) + channel]);
            }
            for index in 0..length {
                target[offset(line, index) + channel] = ((sum + window / 2) / window) as u8;
                let entering = index + half + 1;
                if entering < length {
                    sum += u32::from(source[offset(line, entering) + channel]);
                }
                if index >= half {
                    sum -= u32::from(source[offset(line, index - half) + channel]);
                }
            }
        }
    }
}

/// Source-over of a premultiplied canvas onto an opaque frame of the same size.
fn composite_onto(frame: &mut [u8], canvas: &LayerCanvas) {
    for (destination, source) in frame.chunks_exact_mut(4).zip(canvas.pixels.chunks_exact(4)) {
        if source[3] == 0 {
            continue;
        }
        blend_over(destination, [source[0], source[1], source[2], source[3]]);
        destination[3] = 255;
    }
}

fn draw_grid(frame: &mut [u8], width: u32, height: u32, grid: &GridOverlay) {
    let line_source = premultiply(GRID_LINE_COLOR);
    for line in grid.lines() {
        let x0 = line.start.x.round() as i32;
        let y0 = line.start.y.round() as i32;
        let x1 = line.end.x.round() as i32;
        let y1 = line.end.y.round() as i32;
        blend_rect(
            frame,
            width,
            height,
            x0.min(x1),
            y0.min(y1),
            (x1 - x0).abs() + 1,
            (y1 - y0).abs() + 1,
            line_source,
        );
    }

    let label_source = premultiply(GRID_LABEL_COLOR);
    for label in grid.labels() {
        let left = label.position.x.round() as i32 + GRID_LABEL_INSET_PX;
        let top = label.position.y.round() as i32 + GRID_LABEL_INSET_PX;
        for_each_text_pixel(label.text(), left, top, |x, y| {
            blend_rect(frame, width, height, x, y, 1, 1, label_source);
        });
    }
}

fn draw_selection(frame: &mut [u8], width: u32, height: u32, bounds: &ScreenRect) {
    let x = bounds.min_x().round() as i32;
    let y = bounds.min_y().round() as i32;
    let w = (bounds.width.round() as i32).max(1);
    let h = (bounds.height.round() as i32).max(1);
    blend_rect(frame, width, height, x, y, w, h, premultiply(SELECTION_FILL_COLOR));

    let stroke = premultiply(SELECTION_STROKE_COLOR);
    blend_rect(frame, width, height, x, y, w, 1, stroke);
    blend_rect(frame, width, height, x, y + h - 1, w, 1, stroke);
    blend_rect(frame, width, height, x, y, 1, h, stroke);
    blend_rect(frame, width, height, x + w - 1, y, 1, h, stroke);
}

#[allow(clippy::too_many_arguments)]
fn blend_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    source: [u8; 4],
) {
    let frame_width = width as usize;
    for_each_clipped(x, y, rect_width, rect_height, width, height, |px, py| {
        let offset = (py * frame_width + px) * 4;
        if let Some(pixel) = frame.get_mut(offset..offset + 4) {
            blend_over(pixel, source);
        }
    });
}

fn for_each_clipped(
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    width: u32,
    height: u32,
    mut visit: impl FnMut(usize, usize),
) {
    let start_x = x.max(0);
    let start_y = y.max(0);
    let end_x = x.saturating_add(rect_width).min(width as i32);
    let end_y = y.saturating_add(rect_height).min(height as i32);
    for py in start_y..end_y {
        for px in start_x..end_x {
            visit(px as usize, py as usize);
        }
    }
}

fn premultiply(color: [u8; 4]) -> [u8; 4] {
    [
        mul_div255(color[0], color[3]),
        mul_div255(color[1], color[3]),
        mul_div255(color[2], color[3]),
        color[3],
    ]
}

fn blend_over(destination: &mut [u8], source: [u8; 4]) {
    let uncovered = 255 - source[3];
    for channel in 0..4 {
        destination[channel] =
            source[channel].saturating_add(mul_div255(destination[channel], uncovered));
    }
}

fn mul_div255(value: u8, factor: u8) -> u8 {
    ((u32::from(value) * u32::from(factor) + 127) / 255) as u8
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Axis-aligned rectangle in screen pixels. `width` and `height` are never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    /// Rectangle spanning two corners given in any order.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn min_x(&self) -> f32 {
        self.x
    }

    pub fn min_y(&self) -> f32 {
        self.y
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }
}

/// Conversion between screen pixels and world tile coordinates.
///
/// Implemented by the view-model; every other component depends on it
/// instead of doing its own projection math.
pub trait CoordinateBridge {
    fn pixels_per_tile(&self) -> u32;
    fn screen_to_world_x(&self, screen_x: f32) -> f32;
    fn screen_to_world_y(&self, screen_y: f32) -> f32;
    /// Z level addressed by a screen point.
    fn screen_to_world_z(&self, screen_x: f32, screen_y: f32) -> i32;
    fn world_to_screen_x(&self, world_x: f32) -> f32;
    fn world_to_screen_y(&self, world_y: f32) -> f32;
}

pub const MIN_PIXELS_PER_TILE: u32 = 1;

/// Scrollable tile viewport: a pixel origin over an unbounded tile plane.
///
/// The origin is the world-pixel coordinate shown at screen `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileViewport {
    origin_px: Vec2,
    pixels_per_tile: u32,
    current_z_level: i32,
}

impl TileViewport {
    pub fn new(pixels_per_tile: u32, current_z_level: i32) -> Self {
        Self {
            origin_px: Vec2::default(),
            pixels_per_tile: pixels_per_tile.max(MIN_PIXELS_PER_TILE),
            current_z_level,
        }
    }

    pub fn origin_px(&self) -> Vec2 {
        self.origin_px
    }

    pub fn set_origin_px(&mut self, origin_px: Vec2) {
        self.origin_px = origin_px;
    }

    pub fn move_origin(&mut self, dx: f32, dy: f32) {
        self.origin_px.x += dx;
        self.origin_px.y += dy;
    }

    pub fn current_z_level(&self) -> i32 {
        self.current_z_level
    }

    pub fn set_current_z_level(&mut self, z: i32) {
        self.current_z_level = z;
    }

    /// Index of the tile column/row under screen `(0, 0)`.
    pub fn tile_offset(&self) -> (i32, i32) {
        let ppt = self.pixels_per_tile as f32;
        (
            (self.origin_px.x / ppt).floor() as i32,
            (self.origin_px.y / ppt).floor() as i32,
        )
    }
}

impl CoordinateBridge for TileViewport {
    fn pixels_per_tile(&self) -> u32 {
        self.pixels_per_tile
    }

    fn screen_to_world_x(&self, screen_x: f32) -> f32 {
        (screen_x + self.origin_px.x) / self.pixels_per_tile as f32
    }

    fn screen_to_world_y(&self, screen_y: f32) -> f32 {
        (screen_y + self.origin_px.y) / self.pixels_per_tile as f32
    }

    fn screen_to_world_z(&self, _screen_x: f32, _screen_y: f32) -> i32 {
        self.current_z_level
    }

    fn world_to_screen_x(&self, world_x: f32) -> f32 {
        world_x * self.pixels_per_tile as f32 - self.origin_px.x
    }

    fn world_to_screen_y(&self, world_y: f32) -> f32 {
        world_y * self.pixels_per_tile as f32 - self.origin_px.y
    }
}

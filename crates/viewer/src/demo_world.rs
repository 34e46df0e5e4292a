use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use worldview::{
    CollaboratorError, CoordinateBridge, Simulation, SpriteId, SpriteInfo, SpriteVisual, TileInfo,
    TileViewport, TileVisual, Vec2, ViewModel, ViewModelEvent,
};

pub const WORLD_WIDTH: i32 = 96;
pub const WORLD_HEIGHT: i32 = 64;
pub const TERRAIN_MAX_HEIGHT: i32 = 5;
/// One level above the tallest hill; nothing is cut from this level.
pub const TOP_LEVEL: i32 = TERRAIN_MAX_HEIGHT + 1;
const NOISE_CELL_TILES: i32 = 8;
const WANDERER_COUNT: u64 = 14;
const WANDERER_SPEED_TILES_PER_SECOND: f32 = 1.5;
const WANDERER_HALF_SIZE_PX: u32 = 5;
const ARRIVAL_EPSILON_TILES: f32 = 0.05;
const MAX_CLIMB_PER_STEP: i32 = 1;

const WATER_COLOR: [u8; 4] = [48, 92, 160, 255];
const GRASS_LOW_COLOR: [u8; 4] = [70, 120, 60, 255];
const GRASS_HIGH_COLOR: [u8; 4] = [170, 160, 110, 255];
const ROCK_CUT_COLOR: [u8; 4] = [96, 84, 76, 255];

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub seed: u64,
    pub view_width: u32,
    pub view_height: u32,
    pub pixels_per_tile: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            view_width: 960,
            view_height: 640,
            pixels_per_tile: 24,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Wanderer {
    id: SpriteId,
    /// Tile units; a tile's center is at `+0.5`.
    position: Vec2,
    target: (i32, i32),
    color: [u8; 4],
}

/// Procedural height-map world with creatures walking over the hills.
///
/// Tile and sprite depths are measured downward from the current Z level. Hills that rise
/// above the current level are shown cut open at depth 0.
pub struct DemoWorld {
    view_width: u32,
    view_height: u32,
    heights: Vec<i32>,
    viewport: TileViewport,
    wanderers: Vec<Wanderer>,
    rng: StdRng,
    pending: Vec<ViewModelEvent>,
}

impl DemoWorld {
    pub fn new(config: &DemoConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let heights = generate_heights(&mut rng);
        let wanderers = (1..=WANDERER_COUNT)
            .map(|id| {
                let tile = (
                    rng.gen_range(0..WORLD_WIDTH),
                    rng.gen_range(0..WORLD_HEIGHT),
                );
                Wanderer {
                    id: SpriteId(id),
                    position: tile_center(tile),
                    target: tile,
                    color: [
                        rng.gen_range(160..=255),
                        rng.gen_range(40..=200),
                        rng.gen_range(40..=200),
                        255,
                    ],
                }
            })
            .collect();

        Self {
            view_width: config.view_width,
            view_height: config.view_height,
            heights,
            viewport: TileViewport::new(config.pixels_per_tile, TOP_LEVEL),
            wanderers,
            rng,
            pending: Vec::new(),
        }
    }

    pub fn height_at(&self, x: i32, y: i32) -> Option<i32> {
        if x < 0 || y < 0 || x >= WORLD_WIDTH || y >= WORLD_HEIGHT {
            return None;
        }
        self.heights.get((y * WORLD_WIDTH + x) as usize).copied()
    }

    fn depth_below_level(&self, height: i32) -> i32 {
        (self.viewport.current_z_level() - height).max(0)
    }

    fn tile_info(&self, cell_x: u32, cell_y: u32) -> TileInfo {
        let (offset_x, offset_y) = self.viewport.tile_offset();
        let world_x = offset_x + cell_x as i32;
        let world_y = offset_y + cell_y as i32;
        match self.height_at(world_x, world_y) {
            Some(height) => TileInfo {
                x: cell_x,
                y: cell_y,
                depth: self.depth_below_level(height),
                visual: TileVisual {
                    color: terrain_color(height, self.viewport.current_z_level()),
                },
            },
            None => TileInfo {
                x: cell_x,
                y: cell_y,
                depth: -1,
                visual: TileVisual { color: [0; 4] },
            },
        }
    }

    fn wanderer_tile(wanderer: &Wanderer) -> (i32, i32) {
        (
            wanderer.position.x.floor() as i32,
            wanderer.position.y.floor() as i32,
        )
    }

    /// Negative while the wanderer stands above the current level.
    fn wanderer_depth(&self, wanderer: &Wanderer) -> i32 {
        let (x, y) = Self::wanderer_tile(wanderer);
        let level = self.height_at(x, y).unwrap_or(0);
        self.viewport.current_z_level() - level
    }

    fn wanderer_screen(&self, wanderer: &Wanderer) -> Vec2 {
        Vec2::new(
            self.world_to_screen_x(wanderer.position.x),
            self.world_to_screen_y(wanderer.position.y),
        )
    }

    fn sprite_info(&self, wanderer: &Wanderer) -> SpriteInfo {
        SpriteInfo {
            id: wanderer.id,
            depth: self.wanderer_depth(wanderer),
            screen: self.wanderer_screen(wanderer),
            visual: SpriteVisual {
                color: wanderer.color,
                half_size_px: WANDERER_HALF_SIZE_PX,
            },
        }
    }

    /// Re-announces every visible cell and every sprite after the offset or level changed.
    fn queue_full_refresh(&mut self) {
        let (tiles_x, tiles_y) = self.visible_tile_count();
        let mut events = Vec::with_capacity((tiles_x * tiles_y) as usize + self.wanderers.len() * 2);
        for x in 0..tiles_x {
            for y in 0..tiles_y {
                events.push(ViewModelEvent::TileVisibilityChanged(self.tile_info(x, y)));
            }
        }
        for wanderer in &self.wanderers {
            events.push(ViewModelEvent::SpriteDepthChanged {
                id: wanderer.id,
                depth: self.wanderer_depth(wanderer),
            });
            events.push(ViewModelEvent::SpriteMoved {
                id: wanderer.id,
                screen: self.wanderer_screen(wanderer),
            });
        }
        self.pending.extend(events);
    }

    fn pick_next_target(&mut self, from: (i32, i32)) -> (i32, i32) {
        let Some(from_height) = self.height_at(from.0, from.1) else {
            return from;
        };
        let candidates = NEIGHBOR_OFFSETS
            .iter()
            .map(|(dx, dy)| (from.0 + dx, from.1 + dy))
            .filter(|(x, y)| {
                self.height_at(*x, *y)
                    .is_some_and(|height| (height - from_height).abs() <= MAX_CLIMB_PER_STEP)
            })
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            return from;
        }
        candidates[self.rng.gen_range(0..candidates.len())]
    }
}

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl CoordinateBridge for DemoWorld {
    fn pixels_per_tile(&self) -> u32 {
        self.viewport.pixels_per_tile()
    }

    // Screen space is snapped to whole tiles so tiles, sprites and the grid stay aligned.
    fn screen_to_world_x(&self, screen_x: f32) -> f32 {
        screen_x / self.pixels_per_tile() as f32 + self.viewport.tile_offset().0 as f32
    }

    fn screen_to_world_y(&self, screen_y: f32) -> f32 {
        screen_y / self.pixels_per_tile() as f32 + self.viewport.tile_offset().1 as f32
    }

    fn screen_to_world_z(&self, _screen_x: f32, _screen_y: f32) -> i32 {
        self.viewport.current_z_level()
    }

    fn world_to_screen_x(&self, world_x: f32) -> f32 {
        (world_x - self.viewport.tile_offset().0 as f32) * self.pixels_per_tile() as f32
    }

    fn world_to_screen_y(&self, world_y: f32) -> f32 {
        (world_y - self.viewport.tile_offset().1 as f32) * self.pixels_per_tile() as f32
    }
}

impl ViewModel for DemoWorld {
    fn view_width(&self) -> u32 {
        self.view_width
    }

    fn view_height(&self) -> u32 {
        self.view_height
    }

    /// Ground can sit anywhere down to level 0, so the deepest slice follows the current level.
    fn max_z_level(&self) -> i32 {
        self.viewport.current_z_level()
    }

    fn current_z_level(&self) -> i32 {
        self.viewport.current_z_level()
    }

    fn tile_offset(&self) -> (i32, i32) {
        self.viewport.tile_offset()
    }

    fn visible_tile_count(&self) -> (u32, u32) {
        let tile = self.pixels_per_tile();
        (self.view_width.div_ceil(tile), self.view_height.div_ceil(tile))
    }

    fn visible_tile(&self, x: u32, y: u32) -> Option<TileInfo> {
        let (tiles_x, tiles_y) = self.visible_tile_count();
        if x >= tiles_x || y >= tiles_y {
            return None;
        }
        let info = self.tile_info(x, y);
        (info.depth >= 0).then_some(info)
    }

    fn visible_sprites(&self) -> Vec<SpriteInfo> {
        self.wanderers
            .iter()
            .map(|wanderer| self.sprite_info(wanderer))
            .collect()
    }

    fn move_origin(&mut self, dx: f32, dy: f32) -> Result<(), CollaboratorError> {
        let before = self.viewport.tile_offset();
        let tile = self.pixels_per_tile() as f32;
        let origin = self.viewport.origin_px();
        let half_view_x = self.view_width as f32 / 2.0;
        let half_view_y = self.view_height as f32 / 2.0;
        self.viewport.set_origin_px(Vec2::new(
            (origin.x + dx).clamp(-half_view_x, WORLD_WIDTH as f32 * tile - half_view_x),
            (origin.y + dy).clamp(-half_view_y, WORLD_HEIGHT as f32 * tile - half_view_y),
        ));

        let after = self.viewport.tile_offset();
        if after != before {
            self.pending.push(ViewModelEvent::TileOffsetChanged {
                x: after.0,
                y: after.1,
            });
            self.queue_full_refresh();
        }
        Ok(())
    }

    fn adjust_level(&mut self, delta: i32) -> Result<(), CollaboratorError> {
        let current = self.viewport.current_z_level();
        let next = current.saturating_add(delta).clamp(0, TOP_LEVEL);
        if next == current {
            debug!(level = current, delta, "level_at_limit");
            return Ok(());
        }
        self.viewport.set_current_z_level(next);
        self.pending.push(ViewModelEvent::MaxZLevelChanged);
        self.queue_full_refresh();
        Ok(())
    }

    fn take_notifications(&mut self) -> Vec<ViewModelEvent> {
        std::mem::take(&mut self.pending)
    }
}

impl Simulation for DemoWorld {
    fn advance(&mut self, dt_seconds: f32) {
        let step = WANDERER_SPEED_TILES_PER_SECOND * dt_seconds;
        for index in 0..self.wanderers.len() {
            let mut wanderer = self.wanderers[index];
            let depth_before = self.wanderer_depth(&wanderer);

            let target = tile_center(wanderer.target);
            let dx = target.x - wanderer.position.x;
            let dy = target.y - wanderer.position.y;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance <= ARRIVAL_EPSILON_TILES {
                wanderer.position = target;
                wanderer.target = self.pick_next_target(wanderer.target);
            } else {
                let t = (step / distance).min(1.0);
                wanderer.position.x += dx * t;
                wanderer.position.y += dy * t;
            }
            self.wanderers[index] = wanderer;

            let depth = self.wanderer_depth(&wanderer);
            if depth != depth_before {
                self.pending.push(ViewModelEvent::SpriteDepthChanged {
                    id: wanderer.id,
                    depth,
                });
            }
            self.pending.push(ViewModelEvent::SpriteMoved {
                id: wanderer.id,
                screen: self.wanderer_screen(&wanderer),
            });
        }
    }
}

fn tile_center((x, y): (i32, i32)) -> Vec2 {
    Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
}

fn generate_heights(rng: &mut StdRng) -> Vec<i32> {
    let lattice_w = WORLD_WIDTH / NOISE_CELL_TILES + 2;
    let lattice_h = WORLD_HEIGHT / NOISE_CELL_TILES + 2;
    let lattice = (0..lattice_w * lattice_h)
        .map(|_| rng.gen::<f32>())
        .collect::<Vec<_>>();
    let sample = |lx: i32, ly: i32| lattice[(ly * lattice_w + lx) as usize];

    let mut heights = Vec::with_capacity((WORLD_WIDTH * WORLD_HEIGHT) as usize);
    for y in 0..WORLD_HEIGHT {
        for x in 0..WORLD_WIDTH {
            let (lx, fx) = (x / NOISE_CELL_TILES, smoothstep(x % NOISE_CELL_TILES));
            let (ly, fy) = (y / NOISE_CELL_TILES, smoothstep(y % NOISE_CELL_TILES));
            let top = lerp(sample(lx, ly), sample(lx + 1, ly), fx);
            let bottom = lerp(sample(lx, ly + 1), sample(lx + 1, ly + 1), fx);
            let value = lerp(top, bottom, fy);
            let height = (value * (TERRAIN_MAX_HEIGHT + 1) as f32).floor() as i32;
            heights.push(height.clamp(0, TERRAIN_MAX_HEIGHT));
        }
    }
    heights
}

fn smoothstep(step: i32) -> f32 {
    let t = step as f32 / NOISE_CELL_TILES as f32;
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn terrain_color(height: i32, current_level: i32) -> [u8; 4] {
    if height > current_level {
        return ROCK_CUT_COLOR;
    }
    if height == 0 {
        return WATER_COLOR;
    }
    let t = height as f32 / TERRAIN_MAX_HEIGHT as f32;
    let mix = |channel: usize| {
        lerp(
            GRASS_LOW_COLOR[channel] as f32,
            GRASS_HIGH_COLOR[channel] as f32,
            t,
        )
        .round() as u8
    };
    [mix(0), mix(1), mix(2), 255]
}

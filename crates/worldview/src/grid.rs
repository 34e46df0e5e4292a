use crate::coords::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub start: Vec2,
    pub end: Vec2,
}

/// Coordinate label for one grid cell. The text is refreshed from the live tile offset.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLabel {
    pub cell_x: u32,
    pub cell_y: u32,
    pub position: Vec2,
    text: String,
}

impl GridLabel {
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Static tile-boundary lines plus optional per-cell coordinate labels.
///
/// Never takes part in pointer hit testing.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOverlay {
    lines: Vec<GridLine>,
    labels: Vec<GridLabel>,
    tile_offset: (i32, i32),
}

impl GridOverlay {
    pub fn build(
        tiles_x: u32,
        tiles_y: u32,
        pixels_per_tile: u32,
        with_labels: bool,
        tile_offset: (i32, i32),
    ) -> Self {
        let tile = pixels_per_tile as f32;
        let width = tiles_x as f32 * tile;
        let height = tiles_y as f32 * tile;

        let vertical = (0..=tiles_x).map(|x| GridLine {
            start: Vec2::new(x as f32 * tile, 0.0),
            end: Vec2::new(x as f32 * tile, height),
        });
        let horizontal = (0..=tiles_y).map(|y| GridLine {
            start: Vec2::new(0.0, y as f32 * tile),
            end: Vec2::new(width, y as f32 * tile),
        });
        let lines = vertical.chain(horizontal).collect();

        let labels = if with_labels {
            (0..=tiles_x)
                .flat_map(|x| (0..=tiles_y).map(move |y| (x, y)))
                .map(|(cell_x, cell_y)| GridLabel {
                    cell_x,
                    cell_y,
                    position: Vec2::new(cell_x as f32 * tile, cell_y as f32 * tile),
                    text: String::new(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut overlay = Self {
            lines,
            labels,
            tile_offset,
        };
        overlay.refresh_labels();
        overlay
    }

    pub fn lines(&self) -> &[GridLine] {
        &self.lines
    }

    pub fn labels(&self) -> &[GridLabel] {
        &self.labels
    }

    pub fn tile_offset(&self) -> (i32, i32) {
        self.tile_offset
    }

    pub fn intercepts_pointer(&self) -> bool {
        false
    }

    pub fn on_tile_offset_changed(&mut self, x: i32, y: i32) {
        if self.tile_offset == (x, y) {
            return;
        }
        self.tile_offset = (x, y);
        self.refresh_labels();
    }

    fn refresh_labels(&mut self) {
        let (offset_x, offset_y) = self.tile_offset;
        for label in &mut self.labels {
            label.text = format!(
                "{},{}",
                i64::from(offset_x) + i64::from(label.cell_x),
                i64::from(offset_y) + i64::from(label.cell_y)
            );
        }
    }
}

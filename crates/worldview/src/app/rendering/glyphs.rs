//! 3x5 bitmap font covering the characters grid labels use.

pub const GLYPH_WIDTH: i32 = 3;
pub const GLYPH_HEIGHT: i32 = 5;
pub const GLYPH_ADVANCE: i32 = GLYPH_WIDTH + 1;

type Rows = [u8; GLYPH_HEIGHT as usize];

const DIGITS: [Rows; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b011, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b110],
    [0b011, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b110],
];
const MINUS: Rows = [0b000, 0b000, 0b111, 0b000, 0b000];
const COMMA: Rows = [0b000, 0b000, 0b000, 0b010, 0b100];
const BLANK: Rows = [0; GLYPH_HEIGHT as usize];

fn rows_for(ch: char) -> Rows {
    match ch {
        '0'..='9' => DIGITS[(ch as u8 - b'0') as usize],
        '-' => MINUS,
        ',' => COMMA,
        _ => BLANK,
    }
}

/// Pixel width of `text` when drawn with [`for_each_text_pixel`].
pub fn text_width(text: &str) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        0
    } else {
        count * GLYPH_ADVANCE - 1
    }
}

/// Calls `plot(x, y)` for every lit pixel of `text` with its top-left corner at `(x, y)`.
/// Unsupported characters render as blanks.
pub fn for_each_text_pixel(text: &str, x: i32, y: i32, mut plot: impl FnMut(i32, i32)) {
    for (index, ch) in text.chars().enumerate() {
        let left = x + index as i32 * GLYPH_ADVANCE;
        for (row, bits) in rows_for(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                    plot(left + col, y + row as i32);
                }
            }
        }
    }
}

//! LED matrix frames.
//!
//! The 42 pixels form a rounded 5 x 10 grid. `LED_MAP` gives the chain index
//! of each grid cell, `-1` where the grid has no pixel.

use smart_leds::RGB8;

use compass_core::Rgb;

pub const ROWS: usize = 5;
pub const COLS: usize = 10;
pub const LED_COUNT: usize = 42;

pub type Frame = [RGB8; LED_COUNT];

#[rustfmt::skip]
const LED_MAP: [[i8; COLS]; ROWS] = [
    [-1, -1,  8,  9, 18, 19, 28, 29, 37, 38],
    [-1,  1,  7, 10, 17, 20, 27, 30, 36, 39],
    [ 0,  2,  6, 11, 16, 21, 26, 31, 35, 40],
    [-1,  3,  5, 12, 15, 22, 25, 32, 34, 41],
    [-1, -1,  4, 13, 14, 23, 24, 33, -1, -1],
];

/// Grid centre the needle pivots on.
const CENTRE_ROW: f32 = 2.0;
const CENTRE_COL: f32 = 4.5;
/// Half-width of the lit wedge, degrees.
const NEEDLE_HALF_WIDTH: f32 = 20.0;
const TAIL: RGB8 = RGB8::new(24, 24, 24);

/// Glyph advance including one blank column.
pub const GLYPH_ADVANCE: i32 = 4;

/// 3 x 5 glyphs, one row per byte, MSB of the low three bits on the left.
#[rustfmt::skip]
const FONT_3X5: [[u8; 5]; 36] = [
    [7, 5, 5, 5, 7], [2, 6, 2, 2, 7], [7, 1, 7, 4, 7], [7, 1, 7, 1, 7], // 0-3
    [5, 5, 7, 1, 1], [7, 4, 7, 1, 7], [7, 4, 7, 5, 7], [7, 1, 2, 2, 2], // 4-7
    [7, 5, 7, 5, 7], [7, 5, 7, 1, 7],                                   // 8-9
    [2, 5, 7, 5, 5], [6, 5, 6, 5, 6], [3, 4, 4, 4, 3], [6, 5, 5, 5, 6], // a-d
    [7, 4, 6, 4, 7], [7, 4, 6, 4, 4], [3, 4, 5, 5, 3], [5, 5, 7, 5, 5], // e-h
    [7, 2, 2, 2, 7], [1, 1, 1, 5, 2], [5, 5, 6, 5, 5], [4, 4, 4, 4, 7], // i-l
    [5, 7, 7, 5, 5], [6, 5, 5, 5, 5], [2, 5, 5, 5, 2], [6, 5, 6, 4, 4], // m-p
    [2, 5, 5, 6, 3], [6, 5, 6, 5, 5], [3, 4, 2, 1, 6], [7, 2, 2, 2, 2], // q-t
    [5, 5, 5, 5, 7], [5, 5, 5, 5, 2], [5, 5, 7, 7, 5], [5, 5, 2, 5, 5], // u-x
    [5, 5, 2, 2, 2], [7, 1, 2, 4, 7],                                   // y-z
];

#[inline]
pub fn to_rgb8(color: Rgb) -> RGB8 {
    RGB8::new(color.r, color.g, color.b)
}

fn set_cell(frame: &mut Frame, row: i32, col: i32, color: RGB8) {
    if !(0..ROWS as i32).contains(&row) || !(0..COLS as i32).contains(&col) {
        return;
    }
    let index = LED_MAP[row as usize][col as usize];
    if index >= 0 {
        frame[index as usize] = color;
    }
}

fn angular_distance(a: f32, b: f32) -> f32 {
    let d = compass_core::heading::normalize(a - b);
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}

/// Needle pointing `angle` degrees clockwise from the top edge, with a dim
/// tail opposite.
pub fn needle_frame(angle: f32, color: Rgb) -> Frame {
    let pointer = to_rgb8(color);
    let mut frame = [RGB8::default(); LED_COUNT];
    for (row, cells) in LED_MAP.iter().enumerate() {
        for (col, index) in cells.iter().enumerate() {
            if *index < 0 {
                continue;
            }
            let dx = col as f32 - CENTRE_COL;
            let dy = CENTRE_ROW - row as f32;
            if libm::hypotf(dx, dy) < 0.5 {
                continue;
            }
            let cell_angle = compass_core::heading::normalize(libm::atan2f(dx, dy).to_degrees());
            if angular_distance(cell_angle, angle) <= NEEDLE_HALF_WIDTH {
                frame[*index as usize] = pointer;
            } else if angular_distance(cell_angle, angle + 180.0) <= NEEDLE_HALF_WIDTH {
                frame[*index as usize] = TAIL;
            }
        }
    }
    frame
}

fn glyph(c: char) -> Option<&'static [u8; 5]> {
    let index = match c {
        '0'..='9' => c as usize - '0' as usize,
        'a'..='z' => c as usize - 'a' as usize + 10,
        'A'..='Z' => c as usize - 'A' as usize + 10,
        _ => return None,
    };
    FONT_3X5.get(index)
}

/// Width of `text` in columns when scrolled.
pub fn text_width(text: &str) -> i32 {
    text.chars().count() as i32 * GLYPH_ADVANCE
}

/// `text` drawn with its first column at grid column `-offset`.
pub fn text_frame(text: &str, offset: i32, color: Rgb) -> Frame {
    let on = to_rgb8(color);
    let mut frame = [RGB8::default(); LED_COUNT];
    for (i, c) in text.chars().enumerate() {
        let start = i as i32 * GLYPH_ADVANCE - offset;
        if start >= COLS as i32 {
            break;
        }
        if start + 3 <= 0 {
            continue;
        }
        let Some(rows) = glyph(c) else {
            continue;
        };
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..3 {
                if (bits >> (2 - col)) & 1 != 0 {
                    set_cell(&mut frame, row as i32, start + col, on);
                }
            }
        }
    }
    frame
}

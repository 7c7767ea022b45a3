//! # Block Font
//!
//! Stamps text into one layer of a frame. Each character occupies an
//! 8-column cell; bit `j` of a column byte lights row `j`.
//!
//! ```text
//!   'H' = [00 7F 08 08 08 7F 00 00]
//!
//!   row 6  . # . . . # . .
//!   row 5  . # . . . # . .
//!   row 4  . # . . . # . .
//!   row 3  . # # # # # . .
//!   row 2  . # . . . # . .
//!   row 1  . # . . . # . .
//!   row 0  . # . . . # . .
//! ```

use pov_core::{Frame, Pixel};
use pov_shared::GLYPH_WIDTH;

/// Column bitmaps for one character cell.
pub type Glyph = [u8; GLYPH_WIDTH];

/// Source of character bitmaps.
pub trait GlyphSource {
    /// Columns of `c`, or `None` if the character has no glyph.
    fn glyph_columns(&self, c: char) -> Option<Glyph>;
}

/// The built-in font: `A`-`Z` and `0`-`9`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockFont;

impl GlyphSource for BlockFont {
    fn glyph_columns(&self, c: char) -> Option<Glyph> {
        match c {
            'A'..='Z' => Some(LETTERS[usize::from(c as u8 - b'A')]),
            '0'..='9' => Some(DIGITS[usize::from(c as u8 - b'0')]),
            _ => None,
        }
    }
}

/// Width in columns of `text` when written with [`write_text`].
#[must_use]
pub fn text_width(text: &str) -> usize {
    text.chars().count() * GLYPH_WIDTH
}

/// Writes `text` into `layer` starting at column `offset`.
///
/// The offset may be negative: columns left of zero are clipped, and
/// writing stops at the right edge. Characters without a glyph keep their
/// cell blank. An invalid layer writes nothing.
pub fn write_text<G: GlyphSource + ?Sized>(
    frame: &mut Frame,
    glyphs: &G,
    text: &str,
    offset: i32,
    layer: i32,
    color: Pixel,
) {
    let geometry = frame.geometry();
    if usize::try_from(layer).map_or(true, |l| l >= geometry.layers) {
        return;
    }
    let columns = i64::try_from(geometry.columns).unwrap_or(i64::MAX);
    let width = i64::try_from(GLYPH_WIDTH).unwrap_or(i64::MAX);

    let mut cell_start = i64::from(offset);
    for c in text.chars() {
        if cell_start >= columns {
            return;
        }
        if let Some(glyph) = glyphs.glyph_columns(c) {
            for (pos, slice) in (cell_start..).zip(glyph) {
                if pos < 0 || slice == 0 {
                    continue;
                }
                let Ok(column) = i32::try_from(pos) else {
                    return;
                };
                for row in 0..u8::BITS {
                    if slice & (1 << row) != 0 {
                        // Rows past the frame's extent are clipped by set_pixel.
                        frame.set_pixel(column, row as i32, layer, color);
                    }
                }
            }
        }
        cell_start += width;
    }
}

const DIGITS: [Glyph; 10] = [
    [0x00, 0x00, 0x3C, 0x42, 0x42, 0x3C, 0x00, 0x00],
    [0x00, 0x00, 0x00, 0x22, 0x7E, 0x02, 0x00, 0x00],
    [0x00, 0x00, 0x26, 0x4A, 0xA2, 0x22, 0x00, 0x00],
    [0x00, 0x00, 0x42, 0x52, 0x52, 0x2C, 0x00, 0x00],
    [0x00, 0x00, 0x78, 0x08, 0x7E, 0x08, 0x00, 0x00],
    [0x00, 0x00, 0x72, 0x52, 0x52, 0x4C, 0x00, 0x00],
    [0x00, 0x00, 0x3C, 0x52, 0x52, 0x4C, 0x00, 0x00],
    [0x00, 0x00, 0x40, 0x4E, 0x50, 0x60, 0x00, 0x00],
    [0x00, 0x00, 0x2C, 0x52, 0x52, 0x2C, 0x00, 0x00],
    [0x00, 0x00, 0x30, 0x48, 0x48, 0x3E, 0x00, 0x00],
];

const LETTERS: [Glyph; 26] = [
    [0x00, 0x3F, 0x48, 0x48, 0x48, 0x3F, 0x00, 0x00],
    [0x00, 0x7F, 0x49, 0x49, 0x49, 0x36, 0x00, 0x00],
    [0x00, 0x3E, 0x41, 0x41, 0x41, 0x22, 0x00, 0x00],
    [0x00, 0x7F, 0x41, 0x41, 0x41, 0x3E, 0x00, 0x00],
    [0x00, 0x7F, 0x49, 0x49, 0x49, 0x49, 0x00, 0x00],
    [0x00, 0x7F, 0x48, 0x48, 0x48, 0x48, 0x00, 0x00],
    [0x00, 0x3E, 0x41, 0x49, 0x49, 0x2E, 0x00, 0x00],
    [0x00, 0x7F, 0x08, 0x08, 0x08, 0x7F, 0x00, 0x00],
    [0x00, 0x41, 0x41, 0x7F, 0x41, 0x41, 0x00, 0x00],
    [0x00, 0x06, 0x01, 0x01, 0x01, 0x7E, 0x00, 0x00],
    [0x00, 0x7F, 0x08, 0x08, 0x14, 0x63, 0x00, 0x00],
    [0x00, 0x7F, 0x01, 0x01, 0x01, 0x01, 0x00, 0x00],
    [0x00, 0x7F, 0x20, 0x10, 0x20, 0x7F, 0x00, 0x00],
    [0x00, 0x7F, 0x30, 0x08, 0x06, 0x7F, 0x00, 0x00],
    [0x00, 0x3E, 0x41, 0x41, 0x41, 0x3E, 0x00, 0x00],
    [0x00, 0x7F, 0x48, 0x48, 0x48, 0x30, 0x00, 0x00],
    [0x00, 0x3C, 0x42, 0x47, 0x42, 0x3C, 0x00, 0x00],
    [0x00, 0x7F, 0x48, 0x48, 0x48, 0x37, 0x00, 0x00],
    [0x00, 0x32, 0x49, 0x49, 0x49, 0x26, 0x00, 0x00],
    [0x00, 0x40, 0x40, 0x7F, 0x40, 0x40, 0x00, 0x00],
    [0x00, 0x7E, 0x01, 0x01, 0x01, 0x7E, 0x00, 0x00],
    [0x00, 0x78, 0x06, 0x01, 0x06, 0x78, 0x00, 0x00],
    [0x00, 0x7F, 0x02, 0x04, 0x02, 0x7F, 0x00, 0x00],
    [0x00, 0x63, 0x14, 0x08, 0x14, 0x63, 0x00, 0x00],
    [0x00, 0x70, 0x08, 0x07, 0x08, 0x70, 0x00, 0x00],
    [0x00, 0x43, 0x45, 0x49, 0x51, 0x61, 0x00, 0x00],
];

#[cfg(test)]
mod tests {
    use super::*;
    use pov_core::Geometry;

    fn lit_columns(frame: &Frame, layer: i32) -> Vec<i32> {
        let columns = frame.geometry().columns as i32;
        (0..columns)
            .filter(|&c| (0..8).any(|r| frame.pixel(c, r, layer).is_some_and(Pixel::is_lit)))
            .collect()
    }

    #[test]
    fn test_font_coverage() {
        let font = BlockFont;
        for c in ('A'..='Z').chain('0'..='9') {
            assert!(font.glyph_columns(c).is_some(), "missing glyph {c}");
        }
        assert_eq!(font.glyph_columns('a'), None);
        assert_eq!(font.glyph_columns(' '), None);
        assert_eq!(font.glyph_columns('!'), None);
    }

    #[test]
    fn test_letter_h_bits() {
        let mut frame = Frame::new(Geometry::POV);
        write_text(&mut frame, &BlockFont, "H", 0, 0, Pixel::WHITE);

        // Left stroke: column 1, rows 0..=6.
        for row in 0..7 {
            assert_eq!(frame.pixel(1, row, 0), Some(Pixel::WHITE));
        }
        assert_eq!(frame.pixel(1, 7, 0), Some(Pixel::BLACK));
        // Crossbar: row 3 only.
        assert_eq!(frame.pixel(3, 3, 0), Some(Pixel::WHITE));
        assert_eq!(frame.pixel(3, 2, 0), Some(Pixel::BLACK));
        assert_eq!(lit_columns(&frame, 0), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_negative_offset_clips_left() {
        let mut frame = Frame::new(Geometry::POV);
        // "HI" shifted left by one full cell: only the I remains, at 0..8.
        write_text(&mut frame, &BlockFont, "HI", -8, 2, Pixel::RED);
        assert_eq!(lit_columns(&frame, 2), vec![1, 2, 3, 4, 5]);
        assert_eq!(frame.pixel(3, 6, 2), Some(Pixel::RED));
    }

    #[test]
    fn test_clips_at_right_edge() {
        let mut frame = Frame::new(Geometry::new(10, 8, 1));
        write_text(&mut frame, &BlockFont, "HH", 4, 0, Pixel::GREEN);
        // First H lands on 5..=9, the second starts past the edge.
        assert_eq!(lit_columns(&frame, 0), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_unsupported_char_keeps_its_cell() {
        let mut frame = Frame::new(Geometry::POV);
        write_text(&mut frame, &BlockFont, "H H", 0, 0, Pixel::WHITE);
        assert_eq!(lit_columns(&frame, 0), vec![1, 2, 3, 4, 5, 17, 18, 19, 20, 21]);
        assert_eq!(text_width("H H"), 24);
    }

    #[test]
    fn test_invalid_layer_writes_nothing() {
        let mut frame = Frame::new(Geometry::POV);
        write_text(&mut frame, &BlockFont, "HELLO", 0, -1, Pixel::WHITE);
        write_text(&mut frame, &BlockFont, "HELLO", 0, 6, Pixel::WHITE);
        assert_eq!(frame.lit_count(), 0);
    }

    #[test]
    fn test_far_offsets_are_safe() {
        let mut frame = Frame::new(Geometry::POV);
        write_text(&mut frame, &BlockFont, "ABC", i32::MIN, 0, Pixel::WHITE);
        write_text(&mut frame, &BlockFont, "ABC", i32::MAX, 0, Pixel::WHITE);
        assert_eq!(frame.lit_count(), 0);
    }
}

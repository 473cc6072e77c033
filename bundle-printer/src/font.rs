//! Bitmap text
//!
//! Labels are drawn with the 8×8 `font8x8` glyphs scaled by nearest
//! neighbour. No system fonts are involved, so the same string always
//! produces the same pixels on every machine.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::Luma;

use crate::canvas::Canvas;

/// Glyph cell width as a fraction of the font size
const GLYPH_ASPECT: f32 = 0.75;

/// Distance from glyph top to baseline as a fraction of the font size
const ASCENT: f32 = 0.875;

const FALLBACK: char = '?';

fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| BASIC_FONTS.get(FALLBACK))
        .unwrap_or([0; 8])
}

/// Natural width of `text` at `size` px
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_ASPECT
}

/// Draw `text` with its baseline at `baseline`, left edge at `x`.
///
/// When `max_width` is given and the text is wider, glyphs are squeezed
/// horizontally to fit (height is kept).
pub fn draw_text(
    canvas: &mut Canvas,
    text: &str,
    x: f32,
    baseline: f32,
    size: f32,
    max_width: Option<f32>,
    color: Luma<u8>,
) {
    let natural = text_width(text, size);
    let squeeze = match max_width {
        Some(max) if natural > max && natural > 0.0 => max / natural,
        _ => 1.0,
    };
    let cell_w = size * GLYPH_ASPECT * squeeze;
    let top = baseline - size * ASCENT;

    let y0 = top.round() as i64;
    let y1 = (top + size).round() as i64;
    let rows = (y1 - y0).max(1);

    for (i, ch) in text.chars().enumerate() {
        let bitmap = glyph(ch);
        let left = x + i as f32 * cell_w;
        let x0 = left.round() as i64;
        let x1 = (left + cell_w).round() as i64;
        let cols = (x1 - x0).max(1);

        for py in y0..y1 {
            let row = bitmap[((py - y0) * 8 / rows) as usize];
            if row == 0 {
                continue;
            }
            for px in x0..x1 {
                let col = (px - x0) * 8 / cols;
                // bit 0 is the leftmost pixel
                if (row >> col) & 1 == 1 {
                    canvas.put(px, py, color);
                }
            }
        }
    }
}

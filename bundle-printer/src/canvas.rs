//! Raster canvas
//!
//! Grayscale drawing surface with canvas-style float coordinates. Rectangle
//! edges are snapped by rounding, so fractional layout math (e.g. the 118.4px
//! row pitch) lands on the same pixels every time.

use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;

use crate::error::PrintResult;

pub const BLACK: Luma<u8> = Luma([0]);
pub const WHITE: Luma<u8> = Luma([255]);

pub struct Canvas {
    img: GrayImage,
}

impl Canvas {
    /// New canvas filled with white
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            img: GrayImage::from_pixel(width, height, WHITE),
        }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    /// Fill `[x, x+w) × [y, y+h)`, clipped to the canvas
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Luma<u8>) {
        let (x0, x1) = self.span(x, w, self.img.width());
        let (y0, y1) = self.span(y, h, self.img.height());
        for py in y0..y1 {
            for px in x0..x1 {
                self.img.put_pixel(px, py, color);
            }
        }
    }

    /// Set a single pixel, ignoring coordinates outside the canvas
    pub fn put(&mut self, x: i64, y: i64, color: Luma<u8>) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if x < self.img.width() && y < self.img.height() {
            self.img.put_pixel(x, y, color);
        }
    }

    /// Copy `src` with its top-left corner at `(x, y)`
    pub fn draw_image(&mut self, src: &GrayImage, x: i64, y: i64) {
        image::imageops::replace(&mut self.img, src, x, y);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Luma<u8> {
        *self.img.get_pixel(x, y)
    }

    /// Encode as PNG
    pub fn to_png(&self) -> PrintResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.img
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }

    fn span(&self, start: f32, len: f32, limit: u32) -> (u32, u32) {
        let a = start.round().max(0.0);
        let b = (start + len).round().max(0.0);
        let a = (a as u32).min(limit);
        let b = (b as u32).min(limit);
        (a, b.max(a))
    }
}

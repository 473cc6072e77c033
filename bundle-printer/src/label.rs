//! Bundle label layout
//!
//! 609×812 label: QR code top-left, serial header box to its right, then a
//! five row grid (row 1 full width, rows 2-5 split into two columns) with the
//! bundle attributes.
//!
//! ```text
//! ┌─────────┬──────────────────────┐
//! │ QR      │ (logo)               │
//! │         │ #25-25A17            │
//! ├─────────┴──────────────────────┤
//! │ ITEM NAME                      │
//! ├────────────────┬───────────────┤
//! │ SECTION NUMBER │ SERIES        │
//! │ QUANTITY       │ WEIGHT/12ft   │
//! │ CUT LENGTH     │ WEIGHT/<L>ft  │
//! │ TOTAL WEIGHT   │               │
//! └────────────────┴───────────────┘
//! ```

use image::GrayImage;
use image::imageops::FilterType;
use std::path::Path;

use crate::canvas::{BLACK, Canvas, WHITE};
use crate::error::{PrintError, PrintResult};
use crate::font::draw_text;
use crate::format::format_fixed;
use crate::qr::encode_qr;

pub const LABEL_WIDTH: u32 = 609;
pub const LABEL_HEIGHT: u32 = 812;

const QR_SCALE: u32 = 5;
const QR_MARGIN: u32 = 1;

const LOGO_WIDTH: u32 = 375;
const LOGO_HEIGHT: u32 = 80;

/// Header box is always 407 wide, anchored 21px right of the code
const HEADER_WIDTH: f32 = 407.0;
/// Grid row pitch (cell height + separator)
const ROW_PITCH: f32 = 115.4 + 3.0;

const CAPTION_SIZE: f32 = 18.0;
const VALUE_SIZE: f32 = 50.0;

/// Label layout selector (`0` / `1` on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelLayout {
    /// Short header box with logo, 50px serial
    Compact,
    /// Tall header box, 65px serial, no logo
    Full,
}

impl LabelLayout {
    pub fn code(&self) -> u8 {
        match self {
            LabelLayout::Compact => 0,
            LabelLayout::Full => 1,
        }
    }

    /// Cache file name for a bundle: `<uid>.png` or `<uid>_alt.png`
    pub fn file_name(&self, uid: &str) -> String {
        match self {
            LabelLayout::Compact => format!("{uid}.png"),
            LabelLayout::Full => format!("{uid}_alt.png"),
        }
    }
}

impl TryFrom<u8> for LabelLayout {
    type Error = PrintError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LabelLayout::Compact),
            1 => Ok(LabelLayout::Full),
            other => Err(PrintError::InvalidLayout(other)),
        }
    }
}

/// Everything a label shows, resolved from a bundle and its variant
#[derive(Debug, Clone, PartialEq)]
pub struct LabelFields {
    /// Encoded into the QR code
    pub uid: String,
    pub sr_no: String,
    /// `modified_at.year - 2000`
    pub year_short: i32,
    pub item_name: String,
    pub section_no: String,
    pub series: String,
    pub quantity: i64,
    /// Cut length in feet
    pub length: f64,
    /// Total weight in kg
    pub weight: f64,
}

impl LabelFields {
    pub fn weight_per_piece(&self) -> f64 {
        self.weight / self.quantity as f64
    }

    pub fn weight_per_12ft(&self) -> f64 {
        self.weight_per_piece() / self.length * 12.0
    }

    /// `#<yy>-<sr_no>`
    pub fn header(&self) -> String {
        format!("#{}-{}", self.year_short, self.sr_no)
    }

    /// QR payload. UUIDs are upper-cased so they encode in alphanumeric
    /// mode and stay within version 4 at level H; the label geometry is
    /// laid out for the version 4 code width. Scanned values are mapped
    /// back to the stored lower-case uid on lookup.
    pub fn qr_payload(&self) -> String {
        let is_uuid_like = !self.uid.is_empty()
            && self.uid.chars().all(|c| c.is_ascii_hexdigit() || c == '-');
        if is_uuid_like {
            self.uid.to_ascii_uppercase()
        } else {
            self.uid.clone()
        }
    }
}

/// Deterministic label painter
#[derive(Debug, Clone, Default)]
pub struct LabelPainter {
    logo: Option<GrayImage>,
}

impl LabelPainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `logo` in the compact layout (scaled to 375×80)
    pub fn with_logo(mut self, logo: &image::DynamicImage) -> Self {
        let gray = logo.to_luma8();
        self.logo = Some(image::imageops::resize(
            &gray,
            LOGO_WIDTH,
            LOGO_HEIGHT,
            FilterType::Nearest,
        ));
        self
    }

    /// Load the logo from disk
    pub fn with_logo_file(self, path: impl AsRef<Path>) -> PrintResult<Self> {
        let logo = image::open(path)?;
        Ok(self.with_logo(&logo))
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    /// Render to PNG bytes
    pub fn render_png(&self, fields: &LabelFields, layout: LabelLayout) -> PrintResult<Vec<u8>> {
        self.render(fields, layout)?.to_png()
    }

    pub fn render(&self, fields: &LabelFields, layout: LabelLayout) -> PrintResult<Canvas> {
        let w = LABEL_WIDTH as f32;
        let h = LABEL_HEIGHT as f32;
        let mut canvas = Canvas::new(LABEL_WIDTH, LABEL_HEIGHT);

        // Border
        canvas.fill_rect(0.0, 0.0, w, h, BLACK);
        canvas.fill_rect(3.0, 3.0, w - 6.0, h - 6.0, WHITE);

        // QR code in a black frame
        let qr = encode_qr(&fields.qr_payload(), QR_SCALE, QR_MARGIN)?;
        let qr_w = qr.width() as f32;
        let qr_h = qr.height() as f32;
        canvas.fill_rect(6.0, 6.0, qr_w + 6.0, qr_h + 6.0, BLACK);
        canvas.draw_image(&qr, 9, 9);

        // Header
        let header = fields.header();
        match layout {
            LabelLayout::Compact => {
                if let Some(logo) = &self.logo {
                    canvas.draw_image(logo, (21.0 + qr_w) as i64, 12);
                }
                canvas.fill_rect(21.0 + qr_w, 107.0, HEADER_WIDTH, 80.0, BLACK);
                canvas.fill_rect(qr_w + 24.0, 110.0, HEADER_WIDTH - 6.0, 74.0, WHITE);
                draw_text(
                    &mut canvas,
                    &header,
                    qr_w + 37.0,
                    107.0 + 3.0 + 45.0 + 10.0 + 10.0,
                    50.0,
                    Some(HEADER_WIDTH - 27.0),
                    BLACK,
                );
            }
            LabelLayout::Full => {
                canvas.fill_rect(21.0 + qr_w, 9.0, HEADER_WIDTH, 178.0, BLACK);
                canvas.fill_rect(qr_w + 24.0, 12.0, HEADER_WIDTH - 6.0, 172.0, WHITE);
                draw_text(
                    &mut canvas,
                    &header,
                    qr_w + 37.0,
                    27.0 + 3.0 + 45.0 + 10.0 + 10.0 + 30.0,
                    65.0,
                    Some(345.0),
                    BLACK,
                );
            }
        }

        // Grid
        let inner_w = w - 12.0 - 6.0;
        let half_w = inner_w / 2.0 - 1.5;
        let cell_h = (h - qr_h - 24.0 - 9.0) / 5.0 - 6.0;
        let grid_top = qr_h + 18.0;
        let right_x = 6.0 + 3.0 + (inner_w / 2.0 + 1.5);

        canvas.fill_rect(6.0, grid_top, w - 12.0, h - qr_h - 42.0, BLACK);
        canvas.fill_rect(9.0, grid_top + 3.0, half_w * 2.0 + 3.0, cell_h, WHITE);
        for row in 1..5 {
            let y = grid_top + 3.0 + ROW_PITCH * row as f32;
            canvas.fill_rect(9.0, y, half_w, cell_h, WHITE);
            canvas.fill_rect(right_x, y, half_w, cell_h, WHITE);
        }

        self.draw_captions(&mut canvas, fields, grid_top, half_w);
        self.draw_values(&mut canvas, fields, grid_top);

        Ok(canvas)
    }

    fn draw_captions(&self, canvas: &mut Canvas, fields: &LabelFields, grid_top: f32, half_w: f32) {
        let left_x = 6.0 + 3.0 + 3.0 + 3.0;
        let right_x = half_w + 18.0;
        let base = grid_top + 3.0 + 16.0 + 3.0;
        let length_caption = format!("WEIGHT PER {}ft", fields.length);

        let captions: [(f32, usize, &str); 8] = [
            (left_x, 0, "ITEM NAME"),
            (left_x, 1, "SECTION NUMBER"),
            (right_x, 1, "SERIES"),
            (left_x, 2, "QUANTITY"),
            (right_x, 2, "WEIGHT PER 12ft"),
            (left_x, 3, "CUT LENGTH"),
            (right_x, 3, length_caption.as_str()),
            (left_x, 4, "TOTAL WEIGHT"),
        ];

        for (x, row, text) in captions {
            let y = base + ROW_PITCH * row as f32;
            draw_text(canvas, text, x, y, CAPTION_SIZE, Some(half_w - 12.0), BLACK);
        }
    }

    fn draw_values(&self, canvas: &mut Canvas, fields: &LabelFields, grid_top: f32) {
        let w = LABEL_WIDTH as f32;
        let base = grid_top + 3.0 + 16.0 + 3.0;
        let left_x = w / 4.0 - 275.0 / 2.0;
        let right_x = w * 0.75 + 3.0 - 295.0 / 2.0;

        // Row 1: item name, centered block
        draw_text(
            canvas,
            &fields.item_name,
            w / 2.0 - 14.0 - 550.0 / 2.0,
            base + 45.0 + 20.0,
            VALUE_SIZE,
            Some(550.0),
            BLACK,
        );

        let values: [(f32, usize, f32, String, f32); 7] = [
            (left_x, 1, 50.0 + 15.0, fields.section_no.clone(), 275.0),
            (right_x, 1, 50.0 + 15.0, fields.series.clone(), 290.0),
            (left_x, 2, 50.0 + 20.0, format!("{} pcs", fields.quantity), 275.0),
            (
                right_x,
                2,
                50.0 + 20.0,
                format!("{} kg", format_fixed(fields.weight_per_12ft(), 3)),
                285.0,
            ),
            (
                left_x,
                3,
                50.0 + 20.0,
                format!("{} ft", format_fixed(fields.length, 3)),
                275.0,
            ),
            (
                right_x,
                3,
                50.0 + 20.0,
                format!("{} kg", format_fixed(fields.weight_per_piece(), 3)),
                285.0,
            ),
            (
                left_x,
                4,
                3.0 + 50.0 + 20.0,
                format!("{} kg", format_fixed(fields.weight, 3)),
                275.0,
            ),
        ];

        for (x, row, offset, text, max) in values {
            let y = base + offset + ROW_PITCH * row as f32;
            draw_text(canvas, &text, x, y, VALUE_SIZE, Some(max), BLACK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> LabelFields {
        LabelFields {
            uid: "0f8fad5b-d9cb-469f-a165-70867728950e".to_string(),
            sr_no: "25A17".to_string(),
            year_short: 25,
            item_name: "EQUAL ANGLE 50X50".to_string(),
            section_no: "ISA-50".to_string(),
            series: "S-200".to_string(),
            quantity: 10,
            length: 12.0,
            weight: 250.0,
        }
    }

    #[test]
    fn test_layout_codes_and_file_names() {
        assert_eq!(LabelLayout::try_from(0).unwrap(), LabelLayout::Compact);
        assert_eq!(LabelLayout::try_from(1).unwrap(), LabelLayout::Full);
        assert!(matches!(
            LabelLayout::try_from(2),
            Err(PrintError::InvalidLayout(2))
        ));
        assert_eq!(LabelLayout::Compact.file_name("u"), "u.png");
        assert_eq!(LabelLayout::Full.file_name("u"), "u_alt.png");
        assert_eq!(LabelLayout::Full.code(), 1);
    }

    #[test]
    fn test_derived_weights() {
        let f = fields();
        assert_eq!(f.weight_per_piece(), 25.0);
        assert_eq!(f.weight_per_12ft(), 25.0);
        assert_eq!(f.header(), "#25-25A17");
    }

    #[test]
    fn test_qr_payload_uppercases_uuid_only() {
        let mut f = fields();
        assert_eq!(f.qr_payload(), "0F8FAD5B-D9CB-469F-A165-70867728950E");
        f.uid = "bundle_one".to_string();
        assert_eq!(f.qr_payload(), "bundle_one");
    }

    #[test]
    fn test_render_is_deterministic() {
        let painter = LabelPainter::new();
        let a = painter.render_png(&fields(), LabelLayout::Compact).unwrap();
        let b = painter.render_png(&fields(), LabelLayout::Compact).unwrap();
        assert_eq!(a, b);

        let c = painter.render_png(&fields(), LabelLayout::Full).unwrap();
        let d = painter.render_png(&fields(), LabelLayout::Full).unwrap();
        assert_eq!(c, d);
        assert_ne!(a, c);
    }

    #[test]
    fn test_render_geometry() {
        let canvas = LabelPainter::new()
            .render(&fields(), LabelLayout::Compact)
            .unwrap();
        assert_eq!(canvas.width(), LABEL_WIDTH);
        assert_eq!(canvas.height(), LABEL_HEIGHT);

        // outer border and white interior
        assert_eq!(canvas.pixel(0, 0), BLACK);
        assert_eq!(canvas.pixel(608, 811), BLACK);
        assert_eq!(canvas.pixel(4, 400), WHITE);
        // QR frame
        assert_eq!(canvas.pixel(7, 7), BLACK);
        // separator between the two grid columns, row 2
        let qr_h = 175.0_f32;
        let row2_y = (qr_h + 18.0 + 3.0 + ROW_PITCH + 50.0) as u32;
        assert_eq!(canvas.pixel(304, row2_y), BLACK);
    }

    #[test]
    fn test_logo_only_in_compact_layout() {
        let logo = image::DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 10, BLACK));
        let painter = LabelPainter::new().with_logo(&logo);
        assert!(painter.has_logo());

        // logo area: x from 21+175, y from 12
        let compact = painter.render(&fields(), LabelLayout::Compact).unwrap();
        assert_eq!(compact.pixel(300, 50), BLACK);

        let plain = LabelPainter::new()
            .render(&fields(), LabelLayout::Compact)
            .unwrap();
        assert_eq!(plain.pixel(300, 50), WHITE);
    }
}

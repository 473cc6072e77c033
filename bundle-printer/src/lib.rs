//! # bundle-printer
//!
//! Bundle label rendering and printer bridge delivery - low-level capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - Raster canvas (609×812, 1 byte per pixel)
//! - QR code drawing
//! - Bitmap text with horizontal squeeze to a max width
//! - Compact / full label layouts
//! - HTTP delivery to the printer bridge
//!
//! Business logic (WHAT to print) stays in `bundle-server`:
//! - Bundle / variant lookup
//! - Label cache files
//! - Print queue, retry and delivery status
//!
//! ## Example
//!
//! ```ignore
//! use bundle_printer::{LabelFields, LabelLayout, LabelPainter};
//!
//! let painter = LabelPainter::new();
//! let png = painter.render_png(&fields, LabelLayout::Compact)?;
//! std::fs::write("cache/uid.png", png)?;
//! ```

mod canvas;
mod error;
mod font;
mod format;
mod label;
mod printer;
mod qr;

// Re-exports
pub use canvas::{BLACK, Canvas, WHITE};
pub use error::{PrintError, PrintResult};
pub use font::{draw_text, text_width};
pub use format::{format_fixed, format_precision};
pub use label::{LABEL_HEIGHT, LABEL_WIDTH, LabelFields, LabelLayout, LabelPainter};
pub use printer::{BridgePayload, BridgePrinter, FieldPayload, ImagePayload, Printer};
pub use qr::encode_qr;

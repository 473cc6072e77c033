//! QR code drawing

use image::GrayImage;
use qrcode::{Color, EcLevel, QrCode, Version};

use crate::canvas::{BLACK, WHITE};
use crate::error::{PrintError, PrintResult};

/// Preferred symbol version; 33 modules keeps the code at 175px with the
/// label's scale/margin, which the layout coordinates are built around
const PREFERRED_VERSION: i16 = 4;

/// Encode `payload` at error-correction level H and draw it with `scale`
/// pixels per module and a quiet zone of `margin` modules.
///
/// Uses version 4 when the payload fits, otherwise the smallest version
/// that does.
pub fn encode_qr(payload: &str, scale: u32, margin: u32) -> PrintResult<GrayImage> {
    let code = QrCode::with_version(payload, Version::Normal(PREFERRED_VERSION), EcLevel::H)
        .or_else(|_| QrCode::with_error_correction_level(payload, EcLevel::H))
        .map_err(|e| PrintError::Qr(e.to_string()))?;

    let modules = code.width() as u32;
    let side = (modules + margin * 2) * scale;
    let mut img = GrayImage::from_pixel(side, side, WHITE);

    for my in 0..modules {
        for mx in 0..modules {
            if code[(mx as usize, my as usize)] != Color::Dark {
                continue;
            }
            let x0 = (mx + margin) * scale;
            let y0 = (my + margin) * scale;
            for y in y0..y0 + scale {
                for x in x0..x0 + scale {
                    img.put_pixel(x, y, BLACK);
                }
            }
        }
    }

    Ok(img)
}

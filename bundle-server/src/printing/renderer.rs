//! Label renderer capability
//!
//! Selected once at startup: hosts that cannot or should not rasterize labels
//! get [`DisabledLabelRenderer`], which fails every call with
//! [`RenderError::Unavailable`] instead of half-working.

use bundle_printer::{LabelFields, LabelLayout, LabelPainter, PrintError};
use thiserror::Error;

use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Label rendering is disabled on this server")]
    Unavailable,

    #[error(transparent)]
    Print(#[from] PrintError),
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::Unavailable => {
                AppError::Unavailable("Label rendering is disabled on this server".to_string())
            }
            RenderError::Print(e) => AppError::internal(format!("Label render failed: {e}")),
        }
    }
}

/// Turns resolved label fields into PNG bytes
pub trait LabelRenderer: Send + Sync {
    fn render_png(&self, fields: &LabelFields, layout: LabelLayout) -> Result<Vec<u8>, RenderError>;

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Production renderer backed by [`LabelPainter`]
#[derive(Debug, Clone, Default)]
pub struct RasterLabelRenderer {
    painter: LabelPainter,
}

impl RasterLabelRenderer {
    pub fn new(painter: LabelPainter) -> Self {
        Self { painter }
    }
}

impl LabelRenderer for RasterLabelRenderer {
    fn render_png(&self, fields: &LabelFields, layout: LabelLayout) -> Result<Vec<u8>, RenderError> {
        Ok(self.painter.render_png(fields, layout)?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLabelRenderer;

impl LabelRenderer for DisabledLabelRenderer {
    fn render_png(&self, _fields: &LabelFields, _layout: LabelLayout) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Unavailable)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn fields() -> LabelFields {
        LabelFields {
            uid: "0f8fad5b-d9cb-469f-a165-70867728950e".into(),
            sr_no: "25A5".into(),
            year_short: 25,
            item_name: "Angle".into(),
            section_no: "ISA-50".into(),
            series: "S-200".into(),
            quantity: 10,
            length: 12.0,
            weight: 250.0,
        }
    }

    #[test]
    fn test_raster_renderer_produces_png() {
        let renderer = RasterLabelRenderer::default();
        let png = renderer.render_png(&fields(), LabelLayout::Full).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert!(renderer.is_enabled());
    }

    #[test]
    fn test_disabled_renderer_maps_to_503() {
        let renderer = DisabledLabelRenderer;
        assert!(!renderer.is_enabled());
        let err = renderer.render_png(&fields(), LabelLayout::Compact).unwrap_err();
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

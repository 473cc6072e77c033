//! Label resolution and cache
//!
//! Resolves a bundle and its variant into [`LabelFields`], renders through the
//! configured [`LabelRenderer`] and keeps the PNG under the cache directory as
//! `<uid>.png` / `<uid>_alt.png` for the printer bridge to pick up.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bundle_printer::{FieldPayload, LabelFields, LabelLayout};
use chrono::Datelike;
use shared::models::{Bundle, Variant};
use tracing::{debug, info};

use super::renderer::LabelRenderer;
use crate::db::BundleStorage;
use crate::services::VariantService;
use crate::utils::{AppError, AppResult};

/// Build label fields from a bundle and its variant
pub fn label_fields(bundle: &Bundle, variant: &Variant) -> LabelFields {
    LabelFields {
        uid: bundle.uid.clone(),
        sr_no: bundle.sr_no.clone(),
        year_short: bundle.modified_at.year() - 2000,
        item_name: variant.name.clone(),
        section_no: variant.s_no.clone(),
        series: variant.print_series.clone(),
        quantity: bundle.quantity,
        length: bundle.length,
        weight: bundle.weight,
    }
}

/// A rendered label and where it was cached
#[derive(Debug, Clone)]
pub struct RenderedLabel {
    pub path: PathBuf,
    pub png: Vec<u8>,
}

#[derive(Clone)]
pub struct LabelService {
    storage: BundleStorage,
    variants: VariantService,
    renderer: Arc<dyn LabelRenderer>,
    cache_dir: PathBuf,
}

impl std::fmt::Debug for LabelService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelService")
            .field("cache_dir", &self.cache_dir)
            .field("rendering", &self.renderer.is_enabled())
            .finish_non_exhaustive()
    }
}

impl LabelService {
    pub fn new(
        storage: BundleStorage,
        renderer: Arc<dyn LabelRenderer>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            variants: VariantService::new(storage.clone()),
            storage,
            renderer,
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn rendering_enabled(&self) -> bool {
        self.renderer.is_enabled()
    }

    /// Active bundle and its variant; `None` when either is missing
    pub fn resolve(&self, uid: &str) -> AppResult<Option<(Bundle, Variant)>> {
        let Some(bundle) = self.storage.get_bundle(uid)? else {
            debug!(uid = %uid, "Label requested for unknown bundle");
            return Ok(None);
        };
        let Some(variant) = self.variants.find(&bundle.vs_no)? else {
            debug!(uid = %uid, vs_no = %bundle.vs_no, "Label requested for bundle without variant");
            return Ok(None);
        };
        Ok(Some((bundle, variant)))
    }

    /// Render the label and write it to the cache; `None` when the bundle or
    /// its variant does not exist
    pub fn render(&self, uid: &str, layout: LabelLayout) -> AppResult<Option<RenderedLabel>> {
        let Some((bundle, variant)) = self.resolve(uid)? else {
            return Ok(None);
        };

        let fields = label_fields(&bundle, &variant);
        let png = self.renderer.render_png(&fields, layout)?;

        std::fs::create_dir_all(&self.cache_dir).map_err(|e| {
            AppError::internal(format!("Failed to create label cache {:?}: {e}", self.cache_dir))
        })?;
        let path = self.cache_dir.join(layout.file_name(&bundle.uid));
        std::fs::write(&path, &png)
            .map_err(|e| AppError::internal(format!("Failed to write label {path:?}: {e}")))?;

        info!(uid = %bundle.uid, sr_no = %bundle.sr_no, layout = layout.code(), "Label rendered");
        Ok(Some(RenderedLabel { path, png }))
    }

    /// Bridge payload for printers that lay out the label themselves
    pub fn field_payload(&self, uid: &str, layout: LabelLayout) -> AppResult<Option<FieldPayload>> {
        Ok(self.resolve(uid)?.map(|(bundle, variant)| {
            FieldPayload::from_measurements(
                bundle.uid,
                layout.code(),
                bundle.sr_no,
                bundle.quantity,
                bundle.length,
                bundle.weight,
                variant.print_series,
                bundle.po_no,
            )
        }))
    }
}

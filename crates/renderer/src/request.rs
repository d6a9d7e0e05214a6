//! Render requests: a style and a feature source bound to an output SRS.

use map_common::{Extent, FeatureSource, MapResult, SrsId, StyleDefinition};
use projection::{SrsRegistry, SrsTransform};
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;

use crate::config::{RendererConfig, DEFAULT_MAX_SIZE};
use crate::fontset::FontSet;
use crate::raster::RasterImage;
use crate::rasterize;

/// Per-request rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub max_size: u32,
    pub anti_alias: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            anti_alias: true,
        }
    }
}

impl From<&RendererConfig> for RenderOptions {
    fn from(config: &RendererConfig) -> Self {
        Self {
            max_size: config.max_size,
            anti_alias: config.anti_alias,
        }
    }
}

/// A reusable renderer for one style, one feature source and one output SRS.
///
/// Opening resolves both spatial references once. The request is immutable
/// afterwards and can be shared between threads; every render call allocates
/// its own image.
#[derive(Clone)]
pub struct RenderRequest {
    style: Arc<StyleDefinition>,
    source: Arc<dyn FeatureSource>,
    transform: SrsTransform,
    fonts: Arc<FontSet>,
    options: RenderOptions,
}

impl RenderRequest {
    /// Open with the built-in spatial references, default options and no
    /// fonts (labels are skipped).
    pub fn open(
        style: Arc<StyleDefinition>,
        source: Arc<dyn FeatureSource>,
        output_srs: &SrsId,
    ) -> MapResult<Self> {
        Self::open_with(
            &SrsRegistry::with_defaults(),
            style,
            source,
            output_srs,
            Arc::new(FontSet::empty()),
            RenderOptions::default(),
        )
    }

    /// Open against a specific registry, font set and options.
    ///
    /// Fails with `UnsupportedProjection` when either the source SRS or
    /// `output_srs` is unknown to `registry`, and with `InvalidStyle` when
    /// the style does not validate.
    pub fn open_with(
        registry: &SrsRegistry,
        style: Arc<StyleDefinition>,
        source: Arc<dyn FeatureSource>,
        output_srs: &SrsId,
        fonts: Arc<FontSet>,
        options: RenderOptions,
    ) -> MapResult<Self> {
        style.validate()?;
        let transform = SrsTransform::between(registry, source.srs(), output_srs)?;

        tracing::info!(
            style = %style.name,
            source_srs = %source.srs(),
            output_srs = %output_srs,
            identity = transform.is_identity(),
            "Opened render request"
        );

        Ok(Self {
            style,
            source,
            transform,
            fonts,
            options,
        })
    }

    pub fn style(&self) -> &StyleDefinition {
        &self.style
    }

    pub fn source(&self) -> &dyn FeatureSource {
        self.source.as_ref()
    }

    /// Source SRS to output SRS.
    pub fn transform(&self) -> &SrsTransform {
        &self.transform
    }

    pub fn output_srs(&self) -> &SrsId {
        self.transform.dst()
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Render `extent` (output SRS units) into a `size.0 × size.1` image.
    pub fn render_extent(&self, extent: &Extent, size: (u32, u32)) -> MapResult<RasterImage> {
        rasterize::render_extent(self, extent, size)
    }

    /// Render several extents in parallel. Results are in input order and
    /// fail independently.
    pub fn render_extents(&self, jobs: &[(Extent, (u32, u32))]) -> Vec<MapResult<RasterImage>> {
        jobs.par_iter()
            .map(|(extent, size)| self.render_extent(extent, *size))
            .collect()
    }
}

impl fmt::Debug for RenderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderRequest")
            .field("style", &self.style.name)
            .field("source_srs", self.source.srs())
            .field("output_srs", self.transform.dst())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::{MapError, MemoryFeatureSource};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_request_is_shareable() {
        assert_send_sync::<RenderRequest>();
    }

    #[test]
    fn test_open_rejects_unknown_output_srs() {
        let source = Arc::new(MemoryFeatureSource::new(SrsId::wgs84()));
        let style = Arc::new(StyleDefinition::default_for(None, (1, 2, 3)));
        let err = RenderRequest::open(style, source, &SrsId::epsg(999_999)).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedProjection(_)));
    }

    #[test]
    fn test_open_rejects_unknown_source_srs() {
        let source = Arc::new(MemoryFeatureSource::new(SrsId::new("IAU", 30100)));
        let style = Arc::new(StyleDefinition::default_for(None, (1, 2, 3)));
        let err = RenderRequest::open(style, source, &SrsId::wgs84()).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedProjection(_)));
    }

    #[test]
    fn test_open_revalidates_style() {
        let source = Arc::new(MemoryFeatureSource::new(SrsId::wgs84()));
        let mut style = StyleDefinition::default_for(None, (1, 2, 3));
        style.rules.clear();
        style.fill_color = None;
        let err = RenderRequest::open(Arc::new(style), source, &SrsId::wgs84()).unwrap_err();
        assert!(matches!(err, MapError::InvalidStyle(_)));
    }

    #[test]
    fn test_accessors() {
        let source = Arc::new(MemoryFeatureSource::new(SrsId::web_mercator()));
        let style = Arc::new(StyleDefinition::default_for(None, (1, 2, 3)));
        let request = RenderRequest::open(style, source, &SrsId::wgs84()).unwrap();
        assert_eq!(request.output_srs(), &SrsId::wgs84());
        assert_eq!(request.source().srs(), &SrsId::web_mercator());
        assert!(!request.transform().is_identity());
        assert!(request.fonts().is_empty());
        assert_eq!(request.options(), RenderOptions::default());
    }
}

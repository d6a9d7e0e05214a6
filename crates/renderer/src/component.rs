//! The renderer component a host application instantiates once.

use map_common::{FeatureSource, MapResult, SrsId, StyleDefinition};
use projection::{SpatialReference, SrsRegistry};
use std::sync::Arc;

use crate::config::RendererConfig;
use crate::fontset::FontSet;
use crate::request::{RenderOptions, RenderRequest};

/// Owns the configuration, font set and SRS registry shared by every
/// request it opens.
#[derive(Debug)]
pub struct MapRenderer {
    config: RendererConfig,
    fonts: Arc<FontSet>,
    registry: SrsRegistry,
}

impl MapRenderer {
    /// Build from a configuration. A missing font list leaves the renderer
    /// without fonts; a malformed one is an error.
    pub fn new(config: RendererConfig) -> MapResult<Self> {
        config.validate()?;

        let fonts = match FontSet::load(&config.fontset) {
            Ok(fonts) => fonts,
            Err(e) if !config.fontset.exists() => {
                tracing::warn!(error = %e, "Font list not found, labels will be skipped");
                FontSet::empty()
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            fontset = %config.fontset.display(),
            fonts = fonts.len(),
            max_size = config.max_size,
            anti_alias = config.anti_alias,
            "Renderer ready"
        );

        Ok(Self {
            config,
            fonts: Arc::new(fonts),
            registry: SrsRegistry::with_defaults(),
        })
    }

    /// Defaults overlaid with the environment.
    pub fn from_env() -> MapResult<Self> {
        Self::new(RendererConfig::from_env()?)
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn registry(&self) -> &SrsRegistry {
        &self.registry
    }

    /// Add or replace a spatial reference definition.
    pub fn register_srs(&mut self, srs: SpatialReference) {
        self.registry.register(srs);
    }

    /// Open a render request for `style` and `source` in `srs`.
    pub fn render_request(
        &self,
        style: Arc<StyleDefinition>,
        source: Arc<dyn FeatureSource>,
        srs: &SrsId,
    ) -> MapResult<RenderRequest> {
        RenderRequest::open_with(
            &self.registry,
            style,
            source,
            srs,
            Arc::clone(&self.fonts),
            RenderOptions::from(&self.config),
        )
    }

    /// Like [`render_request`](Self::render_request), parsing the SRS string.
    pub fn render_request_str(
        &self,
        style: Arc<StyleDefinition>,
        source: Arc<dyn FeatureSource>,
        srs: &str,
    ) -> MapResult<RenderRequest> {
        self.render_request(style, source, &SrsId::parse(srs)?)
    }
}

/// Component name and version pairs for a host's system information page.
pub fn sys_info() -> Vec<(&'static str, String)> {
    vec![
        ("mapserver-render", env!("CARGO_PKG_VERSION").to_string()),
        ("rasterizer", "tiny-skia".to_string()),
        ("font engine", "rusttype".to_string()),
        (
            "spatial references",
            SrsRegistry::with_defaults()
                .ids()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        ),
    ]
}

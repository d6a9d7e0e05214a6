//! Style-driven raster map rendering.
//!
//! A [`RenderRequest`] binds a [`StyleDefinition`](map_common::StyleDefinition)
//! and a [`FeatureSource`](map_common::FeatureSource) to an output spatial
//! reference; each [`RenderRequest::render_extent`] call produces an
//! independent [`RasterImage`].
//!
//! ```ignore
//! use std::sync::Arc;
//! use map_common::{default_style_for, Extent, MemoryFeatureSource, SrsId};
//! use renderer::RenderRequest;
//!
//! let source = Arc::new(MemoryFeatureSource::from_geojson_file("layer.geojson", None)?);
//! let style = Arc::new(default_style_for(source.as_ref(), (200, 0, 0)));
//! let request = RenderRequest::open(style, source, &SrsId::wgs84())?;
//! let image = request.render_extent(&Extent::new(-5.0, -5.0, 5.0, 5.0), (64, 64))?;
//! std::fs::write("out.png", image.to_png()?)?;
//! ```

pub mod clip;
pub mod component;
pub mod config;
pub mod fontset;
pub mod png;
pub mod raster;
pub mod rasterize;
pub mod request;

pub use component::{sys_info, MapRenderer};
pub use config::RendererConfig;
pub use fontset::FontSet;
pub use raster::RasterImage;
pub use rasterize::render_extent;
pub use request::{RenderOptions, RenderRequest};

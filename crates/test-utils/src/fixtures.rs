//! Common test fixtures for rendering tests.
//!
//! Pre-defined extents, identifiers and the reference multipolygon scenario.

use map_common::{MemoryFeatureSource, SrsId};

/// Common extent definitions as `(min_x, min_y, max_x, max_y)`.
pub mod extent {
    /// Whole world in geographic degrees
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Continental United States, geographic degrees
    pub const CONUS: (f64, f64, f64, f64) = (-130.0, 20.0, -60.0, 55.0);

    /// Web Mercator world square in meters
    pub const WEB_MERCATOR_WORLD: (f64, f64, f64, f64) = (
        -20037508.342789244,
        -20037508.342789244,
        20037508.342789244,
        20037508.342789244,
    );

    /// Degenerate (zero area)
    pub const POINT: (f64, f64, f64, f64) = (0.0, 0.0, 0.0, 0.0);

    /// Invalid (min > max)
    pub const INVERTED: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);
}

/// Common spatial reference identifiers.
pub mod srs {
    pub const EPSG_4326: &str = "EPSG:4326";
    pub const EPSG_3857: &str = "EPSG:3857";
    pub const CRS_84: &str = "CRS:84";
    /// Syntactically valid but not registered
    pub const UNKNOWN: &str = "EPSG:999999";
}

/// The duplicate-part MultiPolygon Z scenario.
///
/// A frame (outer ring at ±6°, hole at ±3.5°) plus the same ±1.5° square twice,
/// stored in EPSG:3857 and rendered into a 64×64 EPSG:4326 image of
/// (-5,-5,5,5). The frame covers the corners, the hole stays empty and the
/// duplicated center square must stay filled.
pub mod scenario {
    pub const FILE: &str = "multipolygonz-duplicate.geojson";
    pub const COLOR: (u8, u8, u8) = (200, 0, 0);
    pub const FILLED: [u8; 4] = [200, 0, 0, 255];
    pub const EMPTY: [u8; 4] = [0, 0, 0, 0];
    pub const SIZE: u32 = 64;
    pub const EXTENT: (f64, f64, f64, f64) = (-5.0, -5.0, 5.0, 5.0);
    pub const OUTPUT_SRS: &str = super::srs::EPSG_4326;

    /// Pixels that must carry the fill color.
    pub const FILLED_PIXELS: [(u32, u32); 5] = [(5, 5), (5, 59), (59, 5), (59, 59), (32, 32)];

    /// Pixels inside the hole and outside the center square.
    pub const EMPTY_PIXELS: [(u32, u32); 8] = [
        (16, 32),
        (48, 32),
        (32, 16),
        (32, 48),
        (16, 16),
        (48, 16),
        (16, 48),
        (48, 48),
    ];
}

/// Load the duplicate-part MultiPolygon Z fixture as an EPSG:3857 source.
pub fn load_multipolygon_fixture() -> MemoryFeatureSource {
    let path = crate::paths::testdata_dir().join(scenario::FILE);
    MemoryFeatureSource::from_geojson_file(&path, Some(SrsId::web_mercator()))
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

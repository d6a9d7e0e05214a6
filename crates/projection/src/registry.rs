//! Spatial reference definitions and the registry that resolves identifiers
//! to them.

use std::collections::HashMap;

use map_common::{MapError, MapResult, SrsId};

use crate::albers::AlbersEqualArea;
use crate::mercator::{Mercator, WebMercator};
use crate::polar::PolarStereographic;

/// The math behind a spatial reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionDef {
    /// Longitude/latitude in degrees. Datum shifts are not modelled, so all
    /// geographic systems are treated as WGS84.
    Geographic,
    WebMercator(WebMercator),
    Mercator(Mercator),
    PolarStereographic(PolarStereographic),
    AlbersEqualArea(AlbersEqualArea),
}

impl ProjectionDef {
    /// Geographic degrees (lon, lat) to native coordinates.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            ProjectionDef::Geographic => (lon, lat),
            ProjectionDef::WebMercator(p) => p.project(lon, lat),
            ProjectionDef::Mercator(p) => p.project(lon, lat),
            ProjectionDef::PolarStereographic(p) => p.project(lon, lat),
            ProjectionDef::AlbersEqualArea(p) => p.project(lon, lat),
        }
    }

    /// Native coordinates to geographic degrees (lon, lat).
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            ProjectionDef::Geographic => (x, y),
            ProjectionDef::WebMercator(p) => p.unproject(x, y),
            ProjectionDef::Mercator(p) => p.unproject(x, y),
            ProjectionDef::PolarStereographic(p) => p.unproject(x, y),
            ProjectionDef::AlbersEqualArea(p) => p.unproject(x, y),
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, ProjectionDef::Geographic)
    }
}

/// A resolved spatial reference: identifier plus projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialReference {
    pub id: SrsId,
    pub name: String,
    pub projection: ProjectionDef,
}

impl SpatialReference {
    pub fn new(id: SrsId, name: impl Into<String>, projection: ProjectionDef) -> Self {
        Self {
            id,
            name: name.into(),
            projection,
        }
    }

    pub fn is_geographic(&self) -> bool {
        self.projection.is_geographic()
    }
}

/// Lookup table from identifiers to spatial references.
#[derive(Debug, Clone)]
pub struct SrsRegistry {
    entries: HashMap<SrsId, SpatialReference>,
}

impl SrsRegistry {
    /// A registry with nothing in it.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// A registry with the built-in spatial references.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for srs in builtin() {
            registry.register(srs);
        }
        registry
    }

    /// Add or replace a definition.
    pub fn register(&mut self, srs: SpatialReference) {
        if self.entries.contains_key(&srs.id) {
            tracing::debug!(srs = %srs.id, "Replacing spatial reference definition");
        }
        self.entries.insert(srs.id.clone(), srs);
    }

    pub fn contains(&self, id: &SrsId) -> bool {
        self.entries.contains_key(id)
    }

    /// Look up a definition, failing for unknown identifiers.
    pub fn resolve(&self, id: &SrsId) -> MapResult<&SpatialReference> {
        self.entries
            .get(id)
            .ok_or_else(|| MapError::UnsupportedProjection(id.to_string()))
    }

    /// Parse and look up an SRS string such as `"EPSG:3857"`.
    pub fn resolve_str(&self, s: &str) -> MapResult<&SpatialReference> {
        self.resolve(&SrsId::parse(s)?)
    }

    /// Registered identifiers in sorted order.
    pub fn ids(&self) -> Vec<&SrsId> {
        let mut ids: Vec<&SrsId> = self.entries.keys().collect();
        ids.sort();
        ids
    }
}

impl Default for SrsRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn builtin() -> Vec<SpatialReference> {
    vec![
        SpatialReference::new(SrsId::epsg(4326), "WGS 84", ProjectionDef::Geographic),
        SpatialReference::new(SrsId::epsg(4269), "NAD83", ProjectionDef::Geographic),
        SpatialReference::new(
            SrsId::epsg(3857),
            "WGS 84 / Pseudo-Mercator",
            ProjectionDef::WebMercator(WebMercator::default()),
        ),
        SpatialReference::new(
            SrsId::epsg(3395),
            "WGS 84 / World Mercator",
            ProjectionDef::Mercator(Mercator::world()),
        ),
        SpatialReference::new(
            SrsId::epsg(3413),
            "WGS 84 / NSIDC Sea Ice Polar Stereographic North",
            ProjectionDef::PolarStereographic(PolarStereographic::nsidc_north()),
        ),
        SpatialReference::new(
            SrsId::epsg(3031),
            "WGS 84 / Antarctic Polar Stereographic",
            ProjectionDef::PolarStereographic(PolarStereographic::antarctic()),
        ),
        SpatialReference::new(
            SrsId::epsg(5070),
            "NAD83 / Conus Albers",
            ProjectionDef::AlbersEqualArea(AlbersEqualArea::conus()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve() {
        let registry = SrsRegistry::with_defaults();
        for code in [4326, 4269, 3857, 3395, 3413, 3031, 5070] {
            assert!(registry.resolve(&SrsId::epsg(code)).is_ok(), "EPSG:{}", code);
        }
        assert!(registry.resolve_str("EPSG:900913").unwrap().id == SrsId::web_mercator());
    }

    #[test]
    fn test_unknown_srs_is_unsupported() {
        let registry = SrsRegistry::with_defaults();
        let err = registry.resolve(&SrsId::epsg(99999)).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedProjection(_)));
        assert!(SrsRegistry::empty().resolve(&SrsId::wgs84()).is_err());
    }

    #[test]
    fn test_register_custom() {
        let mut registry = SrsRegistry::empty();
        registry.register(SpatialReference::new(
            SrsId::new("local", 1),
            "Local web mercator",
            ProjectionDef::WebMercator(WebMercator { radius: 6371000.0 }),
        ));
        let srs = registry.resolve_str("LOCAL:1").unwrap();
        assert!(!srs.is_geographic());
        assert_eq!(registry.ids().len(), 1);
    }
}

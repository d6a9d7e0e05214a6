//! Point and extent transformation between spatial references.
//!
//! Every transform goes through geographic coordinates: the source inverse
//! followed by the destination forward projection. Transforming within one
//! spatial reference is an exact no-op.

use map_common::{Extent, MapError, MapResult, SrsId};

use crate::registry::{ProjectionDef, SpatialReference, SrsRegistry};

/// Samples per extent edge when densifying.
const EXTENT_EDGE_SAMPLES: usize = 21;

/// A resolved source/destination pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SrsTransform {
    src: SrsId,
    dst: SrsId,
    src_projection: ProjectionDef,
    dst_projection: ProjectionDef,
    identity: bool,
}

impl SrsTransform {
    pub fn new(src: &SpatialReference, dst: &SpatialReference) -> Self {
        let identity = src.id == dst.id
            || (src.projection == dst.projection && src.projection.is_geographic());
        Self {
            src: src.id.clone(),
            dst: dst.id.clone(),
            src_projection: src.projection,
            dst_projection: dst.projection,
            identity,
        }
    }

    /// Resolve both identifiers in a registry.
    pub fn between(registry: &SrsRegistry, src: &SrsId, dst: &SrsId) -> MapResult<Self> {
        Ok(Self::new(registry.resolve(src)?, registry.resolve(dst)?))
    }

    pub fn src(&self) -> &SrsId {
        &self.src
    }

    pub fn dst(&self) -> &SrsId {
        &self.dst
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// The reverse transform.
    pub fn inverse(&self) -> Self {
        Self {
            src: self.dst.clone(),
            dst: self.src.clone(),
            src_projection: self.dst_projection,
            dst_projection: self.src_projection,
            identity: self.identity,
        }
    }

    /// Transform one point. Fails when the result is not finite, e.g. a pole
    /// in a Mercator projection.
    pub fn transform_point(&self, x: f64, y: f64) -> MapResult<(f64, f64)> {
        if self.identity {
            return Ok((x, y));
        }

        let (lon, lat) = self.src_projection.unproject(x, y);
        let (tx, ty) = self.dst_projection.project(lon, lat);

        if !(tx.is_finite() && ty.is_finite()) {
            return Err(MapError::Projection(format!(
                "({}, {}) in {} has no finite position in {}",
                x, y, self.src, self.dst
            )));
        }
        Ok((tx, ty))
    }

    /// Bounding extent, in the destination SRS, of an extent in the source
    /// SRS. Edges are densified so curved images of straight edges are
    /// covered; unprojectable samples are ignored.
    pub fn transform_extent(&self, extent: &Extent) -> MapResult<Extent> {
        if self.identity {
            return Ok(*extent);
        }

        let steps = (EXTENT_EDGE_SAMPLES - 1) as f64;
        let mut samples = Vec::with_capacity(EXTENT_EDGE_SAMPLES * 4);
        for i in 0..EXTENT_EDGE_SAMPLES {
            let t = i as f64 / steps;
            let x = extent.min_x + t * extent.width();
            let y = extent.min_y + t * extent.height();
            samples.push((x, extent.min_y));
            samples.push((x, extent.max_y));
            samples.push((extent.min_x, y));
            samples.push((extent.max_x, y));
        }

        let transformed = samples
            .into_iter()
            .filter_map(|(x, y)| self.transform_point(x, y).ok());

        Extent::from_points(transformed).ok_or_else(|| {
            MapError::Projection(format!(
                "extent {:?} in {} has no finite image in {}",
                extent, self.src, self.dst
            ))
        })
    }
}

/// Transform one point between two identifiers of the default registry.
pub fn transform_point(src: &SrsId, dst: &SrsId, x: f64, y: f64) -> MapResult<(f64, f64)> {
    if src == dst {
        return Ok((x, y));
    }
    SrsTransform::between(&SrsRegistry::with_defaults(), src, dst)?.transform_point(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_exact() {
        let registry = SrsRegistry::with_defaults();
        let t = SrsTransform::between(&registry, &SrsId::web_mercator(), &SrsId::web_mercator())
            .unwrap();
        assert!(t.is_identity());
        let p = (123456.789012345, -987654.321098765);
        assert_eq!(t.transform_point(p.0, p.1).unwrap(), p);
    }

    #[test]
    fn test_web_mercator_to_wgs84() {
        let (lon, lat) =
            transform_point(&SrsId::web_mercator(), &SrsId::wgs84(), 20037508.342789244, 0.0)
                .unwrap();
        assert!((lon - 180.0).abs() < 1e-9);
        assert!(lat.abs() < 1e-12);
    }

    #[test]
    fn test_unknown_srs_fails() {
        let err = transform_point(&SrsId::epsg(1), &SrsId::wgs84(), 0.0, 0.0).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedProjection(_)));
    }

    #[test]
    fn test_pole_into_world_mercator_fails() {
        let err = transform_point(&SrsId::wgs84(), &SrsId::epsg(3395), 0.0, 90.0).unwrap_err();
        assert!(matches!(err, MapError::Projection(_)));
    }

    #[test]
    fn test_transform_extent_covers_corners() {
        let registry = SrsRegistry::with_defaults();
        let t = SrsTransform::between(&registry, &SrsId::wgs84(), &SrsId::web_mercator()).unwrap();
        let extent = t.transform_extent(&Extent::new(-5.0, -5.0, 5.0, 5.0)).unwrap();
        assert!((extent.max_x - 556597.453966).abs() < 1e-3);
        assert!((extent.max_y - 557305.257274).abs() < 1e-3);
        assert!((extent.min_y + extent.max_y).abs() < 1e-6);
    }
}

//! Polar Stereographic projection (EPSG method 9829, "variant B").
//!
//! Defined by the latitude of true scale rather than a scale factor; the
//! hemisphere follows the sign of that latitude. Used for the NSIDC Sea Ice
//! grids (EPSG:3413) and Antarctic mapping (EPSG:3031).

use crate::ellipsoid::{adjust_lon, Ellipsoid};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarStereographic {
    pub ellipsoid: Ellipsoid,
    /// Latitude of true scale in degrees (negative for the south pole)
    pub lat_ts: f64,
    /// Longitude of origin (straight down from the pole) in degrees
    pub lon0: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl PolarStereographic {
    /// EPSG:3413 (WGS 84 / NSIDC Sea Ice Polar Stereographic North).
    pub fn nsidc_north() -> Self {
        Self {
            ellipsoid: Ellipsoid::WGS84,
            lat_ts: 70.0,
            lon0: -45.0,
            false_easting: 0.0,
            false_northing: 0.0,
        }
    }

    /// EPSG:3031 (WGS 84 / Antarctic Polar Stereographic).
    pub fn antarctic() -> Self {
        Self {
            ellipsoid: Ellipsoid::WGS84,
            lat_ts: -71.0,
            lon0: 0.0,
            false_easting: 0.0,
            false_northing: 0.0,
        }
    }

    /// +1 for the north pole, -1 for the south pole.
    fn hemisphere(&self) -> f64 {
        if self.lat_ts >= 0.0 {
            1.0
        } else {
            -1.0
        }
    }

    /// `a * m_c / t_c`, the radius factor applied to `t`.
    fn scale(&self) -> f64 {
        let phi_c = self.hemisphere() * self.lat_ts.to_radians();
        self.ellipsoid.a * self.ellipsoid.msfn(phi_c) / self.ellipsoid.tsfn(phi_c)
    }

    /// Geographic degrees to meters.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let s = self.hemisphere();
        let rho = self.scale() * self.ellipsoid.tsfn(s * lat.to_radians());
        let dlon = (lon - self.lon0).to_radians();
        (
            self.false_easting + rho * dlon.sin(),
            self.false_northing - s * rho * dlon.cos(),
        )
    }

    /// Meters to geographic degrees.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let s = self.hemisphere();
        let dx = x - self.false_easting;
        let dy = y - self.false_northing;
        let rho = dx.hypot(dy);

        if rho == 0.0 {
            return (self.lon0, s * 90.0);
        }

        let phi = self.ellipsoid.phi_from_ts(rho / self.scale());
        let dlon = dx.atan2(-s * dy);
        (adjust_lon(self.lon0 + dlon.to_degrees()), s * phi.to_degrees())
    }
}

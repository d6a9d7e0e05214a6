//! Mercator projections.
//!
//! - [`WebMercator`]: the spherical "Pseudo-Mercator" of web maps (EPSG:3857).
//! - [`Mercator`]: the ellipsoidal World Mercator (EPSG:3395).

use crate::ellipsoid::{adjust_lon, Ellipsoid};

/// Latitude where Web Mercator becomes square (±20037508.34 m).
pub const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Spherical Mercator on a sphere of the WGS84 semi-major axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    pub radius: f64,
}

impl Default for WebMercator {
    fn default() -> Self {
        Self {
            radius: Ellipsoid::WGS84.a,
        }
    }
}

impl WebMercator {
    /// Geographic degrees to meters. Latitude is clamped to the square
    /// world extent.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lat = lat.clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT);
        let x = self.radius * lon.to_radians();
        let y = self.radius * lat.to_radians().tan().asinh();
        (x, y)
    }

    /// Meters to geographic degrees.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = adjust_lon((x / self.radius).to_degrees());
        let lat = (y / self.radius).sinh().atan().to_degrees();
        (lon, lat)
    }
}

/// Ellipsoidal Mercator with the equator as the standard parallel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    pub ellipsoid: Ellipsoid,
    /// Central meridian in degrees
    pub lon0: f64,
}

impl Mercator {
    /// EPSG:3395 (WGS 84 / World Mercator).
    pub fn world() -> Self {
        Self {
            ellipsoid: Ellipsoid::WGS84,
            lon0: 0.0,
        }
    }

    /// Geographic degrees to meters. The poles map to infinity.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let a = self.ellipsoid.a;
        let x = a * (lon - self.lon0).to_radians();
        if lat.abs() >= 90.0 {
            return (x, f64::INFINITY.copysign(lat));
        }
        let y = -a * self.ellipsoid.tsfn(lat.to_radians()).ln();
        (x, y)
    }

    /// Meters to geographic degrees.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let a = self.ellipsoid.a;
        let lon = adjust_lon((x / a).to_degrees() + self.lon0);
        let lat = self.ellipsoid.phi_from_ts((-y / a).exp()).to_degrees();
        (lon, lat)
    }
}

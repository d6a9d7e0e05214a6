//! Albers Equal Area Conic projection (ellipsoidal form).

use crate::ellipsoid::{adjust_lon, Ellipsoid};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbersEqualArea {
    pub ellipsoid: Ellipsoid,
    /// First standard parallel (degrees)
    pub lat1: f64,
    /// Second standard parallel (degrees)
    pub lat2: f64,
    /// Latitude of origin (degrees)
    pub lat0: f64,
    /// Central meridian (degrees)
    pub lon0: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    /// Cone constant
    n: f64,
    /// Snyder's C
    c: f64,
    /// Radius of the origin parallel
    rho0: f64,
}

impl AlbersEqualArea {
    pub fn new(
        ellipsoid: Ellipsoid,
        lat1: f64,
        lat2: f64,
        lat0: f64,
        lon0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let (phi1, phi2, phi0) = (lat1.to_radians(), lat2.to_radians(), lat0.to_radians());
        let (m1, m2) = (ellipsoid.msfn(phi1), ellipsoid.msfn(phi2));
        let (q1, q2, q0) = (
            ellipsoid.qsfn(phi1),
            ellipsoid.qsfn(phi2),
            ellipsoid.qsfn(phi0),
        );

        // Tangent cone when both parallels coincide
        let n = if (phi1 - phi2).abs() < 1e-10 {
            phi1.sin()
        } else {
            (m1 * m1 - m2 * m2) / (q2 - q1)
        };
        let c = m1 * m1 + n * q1;
        let rho0 = ellipsoid.a * (c - n * q0).sqrt() / n;

        Self {
            ellipsoid,
            lat1,
            lat2,
            lat0,
            lon0,
            false_easting,
            false_northing,
            n,
            c,
            rho0,
        }
    }

    /// EPSG:5070 (NAD83 / Conus Albers).
    pub fn conus() -> Self {
        Self::new(Ellipsoid::GRS80, 29.5, 45.5, 23.0, -96.0, 0.0, 0.0)
    }

    /// Geographic degrees to meters.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let a = self.ellipsoid.a;
        let q = self.ellipsoid.qsfn(lat.to_radians());
        let rho = a * (self.c - self.n * q).sqrt() / self.n;
        let theta = self.n * (lon - self.lon0).to_radians();
        (
            self.false_easting + rho * theta.sin(),
            self.false_northing + self.rho0 - rho * theta.cos(),
        )
    }

    /// Meters to geographic degrees.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let a = self.ellipsoid.a;
        let dx = x - self.false_easting;
        let dy = self.rho0 - (y - self.false_northing);

        let (rho, theta) = if self.n < 0.0 {
            (-dx.hypot(dy), (-dx).atan2(-dy))
        } else {
            (dx.hypot(dy), dx.atan2(dy))
        };

        let q = (self.c - rho * rho * self.n * self.n / (a * a)) / self.n;
        let phi = self.ellipsoid.phi_from_q(q);
        let lon = adjust_lon(self.lon0 + (theta / self.n).to_degrees());
        (lon, phi.to_degrees())
    }
}

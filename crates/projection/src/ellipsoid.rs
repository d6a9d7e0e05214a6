//! Reference ellipsoids and the auxiliary latitude functions shared by the
//! ellipsoidal projections (Snyder, "Map Projections: A Working Manual").

use std::f64::consts::FRAC_PI_2;

/// Iteration cap for the inverse latitude series.
const MAX_ITERATIONS: usize = 30;
const CONVERGENCE: f64 = 1e-14;

/// An oblate ellipsoid of revolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6378137.0,
        f: 1.0 / 298.257223563,
    };

    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6378137.0,
        f: 1.0 / 298.257222101,
    };

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// First eccentricity.
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Snyder's `t`: tan(π/4 - φ/2) / ((1 - e sinφ) / (1 + e sinφ))^(e/2).
    pub fn tsfn(&self, phi: f64) -> f64 {
        let e = self.e();
        let esin = e * phi.sin();
        (FRAC_PI_2 / 2.0 - phi / 2.0).tan() / ((1.0 - esin) / (1.0 + esin)).powf(e / 2.0)
    }

    /// Invert [`tsfn`](Self::tsfn) by fixed-point iteration.
    pub fn phi_from_ts(&self, ts: f64) -> f64 {
        let e = self.e();
        let mut phi = FRAC_PI_2 - 2.0 * ts.atan();
        for _ in 0..MAX_ITERATIONS {
            let esin = e * phi.sin();
            let next =
                FRAC_PI_2 - 2.0 * (ts * ((1.0 - esin) / (1.0 + esin)).powf(e / 2.0)).atan();
            let delta = (next - phi).abs();
            phi = next;
            if delta < CONVERGENCE {
                break;
            }
        }
        phi
    }

    /// Snyder's `m`: cosφ / sqrt(1 - e² sin²φ).
    pub fn msfn(&self, phi: f64) -> f64 {
        let sin = phi.sin();
        phi.cos() / (1.0 - self.e2() * sin * sin).sqrt()
    }

    /// Snyder's authalic `q`.
    pub fn qsfn(&self, phi: f64) -> f64 {
        let e = self.e();
        let e2 = self.e2();
        let sin = phi.sin();
        let esin = e * sin;
        (1.0 - e2)
            * (sin / (1.0 - esin * esin) - (1.0 / (2.0 * e)) * ((1.0 - esin) / (1.0 + esin)).ln())
    }

    /// Invert [`qsfn`](Self::qsfn) by Newton iteration.
    pub fn phi_from_q(&self, q: f64) -> f64 {
        let e = self.e();
        let e2 = self.e2();
        let mut phi = (q / 2.0).clamp(-1.0, 1.0).asin();
        for _ in 0..MAX_ITERATIONS {
            let sin = phi.sin();
            let cos = phi.cos();
            if cos.abs() < 1e-12 {
                break;
            }
            let esin = e * sin;
            let one_minus = 1.0 - esin * esin;
            let delta = one_minus * one_minus / (2.0 * cos)
                * (q / (1.0 - e2) - sin / one_minus
                    + (1.0 / (2.0 * e)) * ((1.0 - esin) / (1.0 + esin)).ln());
            phi += delta;
            if delta.abs() < CONVERGENCE {
                break;
            }
        }
        phi
    }
}

/// Slack past ±180 left alone so a world edge does not flip sides.
const LON_EPSILON: f64 = 1e-9;

/// Wraps a longitude in degrees into [-180, 180]. Values already in range,
/// including both bounds, come back unchanged.
pub fn adjust_lon(lon: f64) -> f64 {
    if lon.abs() <= 180.0 + LON_EPSILON || !lon.is_finite() {
        return lon;
    }
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

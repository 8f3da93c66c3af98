//! Seven-parameter Helmert datum shift between geodetic datums.
//!
//! Points are lifted to geocentric cartesian coordinates on the source
//! ellipsoid (height zero), shifted, rotated and scaled, then brought back to
//! geodetic coordinates on the target ellipsoid. Accuracy of the OS published
//! WGS84 -> OSGB36 parameter set is a few metres across Great Britain.

use crate::error::ProjError;
use crate::proj::ellipsoid::{Ellipsoid, AIRY_1830, WGS84};

const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);
/// Latitude precision for the cartesian -> geodetic iteration (radians, ~0.1 mm).
const LAT_TOLERANCE: f64 = 1e-11;
const MAX_ITERATIONS: usize = 16;

#[derive(Clone, Copy, Debug)]
pub struct Helmert {
    source: Ellipsoid,
    target: Ellipsoid,
    /// Translations (metres)
    tx: f64,
    ty: f64,
    tz: f64,
    /// Scale (parts per million)
    s_ppm: f64,
    /// Rotations (arc-seconds)
    rx: f64,
    ry: f64,
    rz: f64,
}

impl Helmert {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Ellipsoid,
        target: Ellipsoid,
        tx: f64,
        ty: f64,
        tz: f64,
        s_ppm: f64,
        rx: f64,
        ry: f64,
        rz: f64,
    ) -> Self {
        Self {
            source,
            target,
            tx,
            ty,
            tz,
            s_ppm,
            rx,
            ry,
            rz,
        }
    }

    /// Ordnance Survey WGS84 -> OSGB36 parameters.
    pub fn wgs84_to_osgb36() -> Self {
        Self::new(
            WGS84, AIRY_1830, -446.448, 125.157, -542.060, 20.4894, -0.1502, -0.2470, -0.8421,
        )
    }

    /// Approximate reverse transform: negated parameters, swapped ellipsoids.
    pub fn inverted(&self) -> Self {
        Self::new(
            self.target,
            self.source,
            -self.tx,
            -self.ty,
            -self.tz,
            -self.s_ppm,
            -self.rx,
            -self.ry,
            -self.rz,
        )
    }

    /// Shift (lon_rad, lat_rad) on the source datum to the target datum.
    pub fn apply(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let (x, y, z) = to_cartesian(&self.source, lon, lat);

        let s1 = 1.0 + self.s_ppm * 1e-6;
        let rx = self.rx * ARCSEC_TO_RAD;
        let ry = self.ry * ARCSEC_TO_RAD;
        let rz = self.rz * ARCSEC_TO_RAD;

        let x2 = self.tx + x * s1 - y * rz + z * ry;
        let y2 = self.ty + x * rz + y * s1 - z * rx;
        let z2 = self.tz - x * ry + y * rx + z * s1;

        from_cartesian(&self.target, x2, y2, z2)
    }
}

fn to_cartesian(ellipsoid: &Ellipsoid, lon: f64, lat: f64) -> (f64, f64, f64) {
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    let nu = ellipsoid.a / (1.0 - ellipsoid.e2 * sin_lat * sin_lat).sqrt();
    (
        nu * cos_lat * cos_lon,
        nu * cos_lat * sin_lon,
        (1.0 - ellipsoid.e2) * nu * sin_lat,
    )
}

fn from_cartesian(ellipsoid: &Ellipsoid, x: f64, y: f64, z: f64) -> Result<(f64, f64), ProjError> {
    let e2 = ellipsoid.e2;
    let p = x.hypot(y);
    let mut lat = z.atan2(p * (1.0 - e2));

    for _ in 0..MAX_ITERATIONS {
        let sin_lat = lat.sin();
        let nu = ellipsoid.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let next = (z + e2 * nu * sin_lat).atan2(p);
        let delta = (next - lat).abs();
        lat = next;
        if delta < LAT_TOLERANCE {
            return Ok((y.atan2(x), lat));
        }
    }

    Err(ProjError::TransformFailed(format!(
        "geodetic latitude did not converge for ({x}, {y}, {z})"
    )))
}

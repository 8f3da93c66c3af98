//! Ordnance Survey National Grid: transverse Mercator on Airy 1830.
//!
//! Forward and inverse follow the OS series (coefficients I..VI and VII..XIIA)
//! from "A Guide to Coordinate Systems in Great Britain", Annex C. Inputs and
//! outputs of the `Projection` impl are radians; eastings and northings are
//! metres from the National Grid false origin.

use crate::error::ProjError;
use crate::proj::common::{meridional_arc, to_radians};
use crate::proj::ellipsoid::{Ellipsoid, AIRY_1830};
use crate::proj::Projection;

/// Scale factor on the central meridian.
pub const F0: f64 = 0.999_601_271_7;
/// Latitude of true origin (degrees).
pub const TRUE_ORIGIN_LAT: f64 = 49.0;
/// Longitude of true origin (degrees).
pub const TRUE_ORIGIN_LON: f64 = -2.0;
/// Easting of the true origin relative to the false origin (metres).
pub const E0: f64 = 400_000.0;
/// Northing of the true origin relative to the false origin (metres).
pub const N0: f64 = -100_000.0;

/// Latitude iteration stops once the arc residual drops below 0.01 mm.
const ARC_TOLERANCE: f64 = 1e-5;
const MAX_ITERATIONS: usize = 32;

#[derive(Clone, Debug)]
pub struct NationalGrid {
    ellipsoid: Ellipsoid,
    f0: f64,
    lat0: f64,
    lon0: f64,
    e0: f64,
    n0: f64,
}

impl NationalGrid {
    pub fn new(ellipsoid: Ellipsoid, f0: f64, lat0: f64, lon0: f64, e0: f64, n0: f64) -> Self {
        Self {
            ellipsoid,
            f0,
            lat0,
            lon0,
            e0,
            n0,
        }
    }

    /// The British National Grid (EPSG:27700 projection parameters).
    pub fn ordnance_survey() -> Self {
        Self::new(
            AIRY_1830,
            F0,
            to_radians(TRUE_ORIGIN_LAT),
            to_radians(TRUE_ORIGIN_LON),
            E0,
            N0,
        )
    }

    /// Transverse (ν) and meridional (ρ) radii of curvature at `lat`, scaled by F0.
    fn radii(&self, sin_lat: f64) -> (f64, f64) {
        let a_f0 = self.ellipsoid.a * self.f0;
        let e2 = self.ellipsoid.e2;
        let w = 1.0 - e2 * sin_lat * sin_lat;
        let nu = a_f0 / w.sqrt();
        let rho = a_f0 * (1.0 - e2) / w.powf(1.5);
        (nu, rho)
    }

    fn arc(&self, lat: f64) -> f64 {
        meridional_arc(&self.ellipsoid, self.f0, lat, self.lat0)
    }
}

impl Default for NationalGrid {
    fn default() -> Self {
        Self::ordnance_survey()
    }
}

impl Projection for NationalGrid {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (nu, rho) = self.radii(sin_lat);
        let eta2 = nu / rho - 1.0;

        let m = self.arc(lat);

        let cos3 = cos_lat * cos_lat * cos_lat;
        let cos5 = cos3 * cos_lat * cos_lat;
        let tan2 = lat.tan() * lat.tan();
        let tan4 = tan2 * tan2;

        let i = m + self.n0;
        let ii = nu / 2.0 * sin_lat * cos_lat;
        let iii = nu / 24.0 * sin_lat * cos3 * (5.0 - tan2 + 9.0 * eta2);
        let iiia = nu / 720.0 * sin_lat * cos5 * (61.0 - 58.0 * tan2 + tan4);
        let iv = nu * cos_lat;
        let v = nu / 6.0 * cos3 * (nu / rho - tan2);
        let vi = nu / 120.0
            * cos5
            * (5.0 - 18.0 * tan2 + tan4 + 14.0 * eta2 - 58.0 * tan2 * eta2);

        let dl = lon - self.lon0;
        let dl2 = dl * dl;
        let dl3 = dl2 * dl;
        let dl4 = dl3 * dl;
        let dl5 = dl4 * dl;
        let dl6 = dl5 * dl;

        let northing = i + ii * dl2 + iii * dl4 + iiia * dl6;
        let easting = self.e0 + iv * dl + v * dl3 + vi * dl5;

        Ok((easting, northing))
    }

    fn inverse(&self, easting: f64, northing: f64) -> Result<(f64, f64), ProjError> {
        if !easting.is_finite() || !northing.is_finite() {
            return Err(ProjError::TransformFailed(format!(
                "non-finite grid coordinate ({easting}, {northing})"
            )));
        }

        let a_f0 = self.ellipsoid.a * self.f0;

        // Iterate latitude until the meridional arc matches the northing
        let mut lat = (northing - self.n0) / a_f0 + self.lat0;
        let mut m = self.arc(lat);
        let mut converged = false;
        for _ in 0..MAX_ITERATIONS {
            let residual = northing - self.n0 - m;
            if residual.abs() < ARC_TOLERANCE {
                converged = true;
                break;
            }
            lat += residual / a_f0;
            m = self.arc(lat);
        }
        if !converged {
            return Err(ProjError::TransformFailed(format!(
                "latitude did not converge for ({easting}, {northing})"
            )));
        }

        let (sin_lat, cos_lat) = lat.sin_cos();
        let (nu, rho) = self.radii(sin_lat);
        let eta2 = nu / rho - 1.0;

        let tan = lat.tan();
        let tan2 = tan * tan;
        let tan4 = tan2 * tan2;
        let tan6 = tan4 * tan2;
        let sec = 1.0 / cos_lat;
        let nu3 = nu * nu * nu;
        let nu5 = nu3 * nu * nu;
        let nu7 = nu5 * nu * nu;

        let vii = tan / (2.0 * rho * nu);
        let viii = tan / (24.0 * rho * nu3) * (5.0 + 3.0 * tan2 + eta2 - 9.0 * tan2 * eta2);
        let ix = tan / (720.0 * rho * nu5) * (61.0 + 90.0 * tan2 + 45.0 * tan4);
        let x = sec / nu;
        let xi = sec / (6.0 * nu3) * (nu / rho + 2.0 * tan2);
        let xii = sec / (120.0 * nu5) * (5.0 + 28.0 * tan2 + 24.0 * tan4);
        let xiia = sec / (5040.0 * nu7) * (61.0 + 662.0 * tan2 + 1320.0 * tan4 + 720.0 * tan6);

        let de = easting - self.e0;
        let de2 = de * de;
        let de3 = de2 * de;
        let de4 = de3 * de;
        let de5 = de4 * de;
        let de6 = de5 * de;
        let de7 = de6 * de;

        let lat_out = lat - vii * de2 + viii * de4 - ix * de6;
        let lon_out = self.lon0 + x * de - xi * de3 + xii * de5 - xiia * de7;

        Ok((lon_out, lat_out))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

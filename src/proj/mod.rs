pub mod common;
pub mod crs;
pub mod ellipsoid;
pub mod helmert;
pub mod national_grid;
pub mod pipeline;

use crate::error::ProjError;
use crate::proj::ellipsoid::Ellipsoid;

/// A map projection between geodetic coordinates on one ellipsoid and grid metres.
pub trait Projection: Send + Sync {
    /// (lon_rad, lat_rad) -> (easting, northing)
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError>;

    /// (easting, northing) -> (lon_rad, lat_rad)
    fn inverse(&self, easting: f64, northing: f64) -> Result<(f64, f64), ProjError>;

    /// Forward transform over a slice, in place.
    fn forward_batch(&self, coords: &mut [(f64, f64)]) -> Result<(), ProjError> {
        for c in coords.iter_mut() {
            *c = self.forward(c.0, c.1)?;
        }
        Ok(())
    }

    /// The ellipsoid geodetic coordinates refer to.
    fn ellipsoid(&self) -> &Ellipsoid;
}

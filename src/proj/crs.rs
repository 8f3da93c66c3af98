use crate::error::ProjError;
use proj4rs::Proj;

/// PROJ definition of the British National Grid (EPSG:27700) with its
/// seven-parameter shift to WGS84.
pub const BRITISH_NATIONAL_GRID: &str = "+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 \
    +x_0=400000 +y_0=-100000 +ellps=airy \
    +towgs84=446.448,-125.157,542.06,0.15,0.247,0.842,-20.489 +units=m +no_defs";

/// Thin wrapper around proj4rs from a geographic source CRS to the National Grid.
///
/// proj4rs uses radians for geographic CRS while callers hand us degrees;
/// the wrapper converts at the boundary.
pub struct CrsTransform {
    src: Proj,
    grid: Proj,
}

impl CrsTransform {
    /// Create a transform from a geographic source CRS string to the National Grid.
    ///
    /// Accepts EPSG codes ("EPSG:4258") or PROJ strings ("+proj=longlat ...").
    pub fn new(src_crs: &str) -> Result<Self, ProjError> {
        let src = Proj::from_user_string(src_crs)
            .map_err(|e| ProjError::UnknownCrs(format!("{src_crs}: {e}")))?;
        if !src.is_latlong() {
            return Err(ProjError::InvalidParameter(format!(
                "{src_crs} is not a geographic CRS"
            )));
        }
        let grid = Proj::from_user_string(BRITISH_NATIONAL_GRID)
            .map_err(|e| ProjError::UnknownCrs(format!("EPSG:27700: {e}")))?;
        Ok(Self { src, grid })
    }

    /// Geographic (lon, lat) in degrees to National Grid (easting, northing) in metres.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let mut point = (lon.to_radians(), lat.to_radians());
        proj4rs::transform::transform(&self.src, &self.grid, &mut point)
            .map_err(|e| ProjError::TransformFailed(e.to_string()))?;
        Ok(point)
    }

    /// National Grid (easting, northing) in metres to geographic (lon, lat) in degrees.
    pub fn inverse(&self, easting: f64, northing: f64) -> Result<(f64, f64), ProjError> {
        let mut point = (easting, northing);
        proj4rs::transform::transform(&self.grid, &self.src, &mut point)
            .map_err(|e| ProjError::TransformFailed(e.to_string()))?;
        Ok((point.0.to_degrees(), point.1.to_degrees()))
    }

    /// Batch forward transform, in place. Input degrees, output metres.
    pub fn forward_batch(&self, coords: &mut [(f64, f64)]) -> Result<(), ProjError> {
        for c in coords.iter_mut() {
            c.0 = c.0.to_radians();
            c.1 = c.1.to_radians();
        }

        proj4rs::transform::transform(&self.src, &self.grid, coords)
            .map_err(|e| ProjError::TransformFailed(e.to_string()))
    }
}

//! Pipeline from a geographic source CRS to the National Grid, dispatching
//! between native pure-Rust math and a proj4rs fallback.

use crate::error::ProjError;
use crate::proj::common::{to_degrees, to_radians};
use crate::proj::crs::CrsTransform;
use crate::proj::helmert::Helmert;
use crate::proj::national_grid::NationalGrid;
use crate::proj::Projection;

/// OSGB36 geographic: projected directly, no datum shift.
pub const OSGB36: &str = "EPSG:4277";
/// WGS84 geographic: Helmert shift to OSGB36 before projecting.
pub const WGS84: &str = "EPSG:4326";

/// A source-CRS-to-National-Grid transform pipeline.
///
/// For OSGB36 and WGS84 input, uses native pure-Rust math.
/// Falls back to proj4rs for anything else.
pub enum Pipeline {
    /// Optional datum shift onto OSGB36, then the OS projection.
    Native {
        datum: Option<Helmert>,
        grid: NationalGrid,
    },
    /// Fallback to proj4rs for unsupported CRSes.
    Proj4rs(Box<CrsTransform>),
}

impl Pipeline {
    /// Create a Pipeline from a geographic source CRS string.
    ///
    /// Recognized EPSG codes get native math; anything else goes through proj4rs.
    pub fn new(src_crs: &str) -> Result<Self, ProjError> {
        match parse_epsg(src_crs) {
            Some(4277) => Ok(Self::osgb36()),
            Some(4326) => Ok(Self::wgs84()),
            _ => {
                let ct = CrsTransform::new(src_crs)?;
                Ok(Pipeline::Proj4rs(Box::new(ct)))
            }
        }
    }

    /// Input treated as OSGB36 latitude/longitude.
    pub fn osgb36() -> Self {
        Pipeline::Native {
            datum: None,
            grid: NationalGrid::ordnance_survey(),
        }
    }

    /// Input treated as WGS84 latitude/longitude.
    pub fn wgs84() -> Self {
        Pipeline::Native {
            datum: Some(Helmert::wgs84_to_osgb36()),
            grid: NationalGrid::ordnance_survey(),
        }
    }

    /// Whether input coordinates are shifted onto OSGB36 before projecting.
    pub fn shifts_datum(&self) -> bool {
        match self {
            Pipeline::Native { datum, .. } => datum.is_some(),
            Pipeline::Proj4rs(_) => true,
        }
    }

    /// Geographic (lon, lat) in degrees to (easting, northing) in metres.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        match self {
            Pipeline::Native { datum, grid } => forward_native(datum.as_ref(), grid, lon, lat),
            Pipeline::Proj4rs(ct) => ct.forward(lon, lat),
        }
    }

    /// (easting, northing) in metres back to geographic (lon, lat) in degrees.
    pub fn inverse(&self, easting: f64, northing: f64) -> Result<(f64, f64), ProjError> {
        match self {
            Pipeline::Native { datum, grid } => {
                let (lon, lat) = grid.inverse(easting, northing)?;
                let (lon, lat) = match datum {
                    Some(helmert) => helmert.inverted().apply(lon, lat)?,
                    None => (lon, lat),
                };
                Ok((to_degrees(lon), to_degrees(lat)))
            }
            Pipeline::Proj4rs(ct) => ct.inverse(easting, northing),
        }
    }

    /// Batch forward transform, in place. Input degrees, output metres.
    pub fn forward_batch(&self, coords: &mut [(f64, f64)]) -> Result<(), ProjError> {
        match self {
            Pipeline::Native { .. } => {
                for c in coords.iter_mut() {
                    *c = self.forward(c.0, c.1)?;
                }
                Ok(())
            }
            Pipeline::Proj4rs(ct) => ct.forward_batch(coords),
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::osgb36()
    }
}

/// Degrees in, metres out: optional Helmert shift then the OS projection.
pub(crate) fn forward_native(
    datum: Option<&Helmert>,
    grid: &NationalGrid,
    lon: f64,
    lat: f64,
) -> Result<(f64, f64), ProjError> {
    let (lon, lat) = (to_radians(lon), to_radians(lat));
    let (lon, lat) = match datum {
        Some(helmert) => helmert.apply(lon, lat)?,
        None => (lon, lat),
    };
    grid.forward(lon, lat)
}

/// Try to parse an EPSG code.
fn parse_epsg(crs: &str) -> Option<u32> {
    crs.strip_prefix("EPSG:")
        .or_else(|| crs.strip_prefix("epsg:"))?
        .parse::<u32>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_native_dispatch() {
        assert!(matches!(
            Pipeline::new(OSGB36).unwrap(),
            Pipeline::Native { datum: None, .. }
        ));
        assert!(matches!(
            Pipeline::new(WGS84).unwrap(),
            Pipeline::Native { datum: Some(_), .. }
        ));
    }

    #[test]
    fn test_fallback_to_proj4rs() {
        let pipe = Pipeline::new("+proj=longlat +datum=WGS84 +no_defs").unwrap();
        assert!(matches!(pipe, Pipeline::Proj4rs(_)));
        assert!(pipe.shifts_datum());
    }

    #[test]
    fn test_unknown_crs() {
        assert!(Pipeline::new("EPSG:99999").is_err());
    }

    #[test]
    fn test_osgb36_true_origin() {
        let pipe = Pipeline::osgb36();
        let (e, n) = pipe.forward(-2.0, 49.0).unwrap();
        assert_relative_eq!(e, 400_000.0, epsilon = 1e-6);
        assert_relative_eq!(n, -100_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_native_matches_proj4rs() {
        let native = Pipeline::wgs84();
        let fallback = Pipeline::new("+proj=longlat +datum=WGS84 +no_defs").unwrap();

        let test_points: &[(f64, f64)] = &[
            (-0.1275, 51.5072),
            (-3.1883, 55.9533),
            (-3.1762, 51.4778),
            (1.7000, 52.6000),
        ];

        for &(lon, lat) in test_points {
            let (e_n, n_n) = native.forward(lon, lat).unwrap();
            let (e_p, n_p) = fallback.forward(lon, lat).unwrap();
            // Same parameter set, different inversion of the cartesian step
            assert_relative_eq!(e_n, e_p, epsilon = 1.0);
            assert_relative_eq!(n_n, n_p, epsilon = 1.0);
        }
    }

    #[test]
    fn test_wgs84_roundtrip() {
        let pipe = Pipeline::wgs84();
        let (e, n) = pipe.forward(-4.2518, 55.8642).unwrap();
        let (lon, lat) = pipe.inverse(e, n).unwrap();
        assert_relative_eq!(lon, -4.2518, epsilon = 1e-6);
        assert_relative_eq!(lat, 55.8642, epsilon = 1e-6);
    }

    #[test]
    fn test_batch_transform() {
        let pipe = Pipeline::osgb36();
        let mut coords = vec![(-0.1275, 51.5072), (-2.0, 49.0)];
        pipe.forward_batch(&mut coords).unwrap();
        assert_relative_eq!(coords[0].0, 529_937.211, epsilon = 1e-3);
        assert_relative_eq!(coords[0].1, 180_412.288, epsilon = 1e-3);
        assert_relative_eq!(coords[1].0, 400_000.0, epsilon = 1e-6);
    }
}

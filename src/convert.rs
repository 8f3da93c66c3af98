//! Geographic coordinates to National Grid references.
//!
//! `GridReferenceConverter` chains the projection pipeline, a fixed empirical
//! correction and the letter encoding. It holds no mutable state and can be
//! shared freely between threads.

use ndarray::ArrayView1;
use rayon::prelude::*;

use crate::coord::{GeographicCoordinate, ProjectedCoordinate};
use crate::error::GridError;
use crate::gridref::{Digits, GridReference};
use crate::proj::pipeline::{self, Pipeline};

/// Empirical easting offset applied after projecting WGS84 input directly on
/// Airy 1830. A known deviation from the canonical OSGB36 formula, kept
/// because the map display was calibrated against it.
pub const EMPIRICAL_EASTING_OFFSET_METERS: f64 = 100.0;

/// Additional northing offset that only the device accumulator form applied.
pub const ACCUMULATOR_NORTHING_OFFSET_METERS: f64 = -18.0;

/// Fixed offset (metres) added to the projected easting and northing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Correction {
    pub easting: f64,
    pub northing: f64,
}

impl Correction {
    pub const NONE: Correction = Correction {
        easting: 0.0,
        northing: 0.0,
    };

    /// Mouse-position readout. The default.
    pub const MAP_DISPLAY: Correction = Correction {
        easting: EMPIRICAL_EASTING_OFFSET_METERS,
        northing: 0.0,
    };

    /// Grid reference stored with device accumulator updates.
    pub const DEVICE_ACCUMULATORS: Correction = Correction {
        easting: EMPIRICAL_EASTING_OFFSET_METERS,
        northing: ACCUMULATOR_NORTHING_OFFSET_METERS,
    };

    /// Parse a preset from its name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::NONE),
            "map" | "map_display" => Some(Self::MAP_DISPLAY),
            "accumulators" | "device_accumulators" => Some(Self::DEVICE_ACCUMULATORS),
            _ => None,
        }
    }

    /// The preset matching a pipeline: the empirical offsets only make sense
    /// when no datum shift is performed.
    pub fn default_for(pipeline: &Pipeline) -> Self {
        if pipeline.shifts_datum() {
            Self::NONE
        } else {
            Self::MAP_DISPLAY
        }
    }

    pub fn apply(&self, easting: f64, northing: f64) -> (f64, f64) {
        (easting + self.easting, northing + self.northing)
    }

    pub fn remove(&self, easting: f64, northing: f64) -> (f64, f64) {
        (easting - self.easting, northing - self.northing)
    }
}

impl Default for Correction {
    fn default() -> Self {
        Self::MAP_DISPLAY
    }
}

/// Converter settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ConverterConfig {
    /// Geographic CRS of the input coordinates (see `Pipeline::new`).
    pub source_crs: String,
    /// `None` picks `Correction::default_for` the resulting pipeline.
    pub correction: Option<Correction>,
    pub digits: Digits,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            source_crs: pipeline::OSGB36.to_string(),
            correction: None,
            digits: Digits::DEFAULT,
        }
    }
}

pub struct GridReferenceConverter {
    pipeline: Pipeline,
    correction: Correction,
    digits: Digits,
}

impl GridReferenceConverter {
    /// Historic behaviour: no datum shift, `Correction::MAP_DISPLAY`, 8 figures.
    pub fn new() -> Self {
        Self {
            pipeline: Pipeline::osgb36(),
            correction: Correction::MAP_DISPLAY,
            digits: Digits::DEFAULT,
        }
    }

    /// WGS84 input with a Helmert shift onto OSGB36 and no empirical offsets.
    pub fn wgs84() -> Self {
        Self {
            pipeline: Pipeline::wgs84(),
            correction: Correction::NONE,
            digits: Digits::DEFAULT,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Result<Self, GridError> {
        let pipeline = Pipeline::new(&config.source_crs)?;
        let correction = config
            .correction
            .unwrap_or_else(|| Correction::default_for(&pipeline));
        Ok(Self {
            pipeline,
            correction,
            digits: config.digits,
        })
    }

    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.correction = correction;
        self
    }

    pub fn with_digits(mut self, digits: Digits) -> Self {
        self.digits = digits;
        self
    }

    pub fn correction(&self) -> Correction {
        self.correction
    }

    pub fn digits(&self) -> Digits {
        self.digits
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Corrected easting/northing for a geographic coordinate in degrees.
    pub fn project(&self, lon: f64, lat: f64) -> Result<ProjectedCoordinate, GridError> {
        let (e, n) = self.pipeline.forward(lon, lat)?;
        let (e, n) = self.correction.apply(e, n);
        Ok(ProjectedCoordinate::new(e, n))
    }

    /// Grid reference for (lon, lat) in degrees at the requested precision.
    ///
    /// Points outside the lettered squares yield `GridError::OutOfRange`.
    pub fn convert(
        &self,
        lon: f64,
        lat: f64,
        digits: Digits,
    ) -> Result<GridReference, GridError> {
        let p = self.project(lon, lat)?;
        GridReference::from_projected(p.easting, p.northing, digits)
    }

    /// Grid reference at the configured precision.
    pub fn to_grid_reference(
        &self,
        coord: GeographicCoordinate,
    ) -> Result<GridReference, GridError> {
        self.convert(coord.lon, coord.lat, self.digits)
    }

    /// Formatted reference at the configured precision, or an empty string
    /// when the point has no grid reference.
    pub fn display(&self, lon: f64, lat: f64) -> String {
        self.convert(lon, lat, self.digits)
            .map(|r| r.to_string())
            .unwrap_or_default()
    }

    /// Geographic position of the south-west corner of a grid reference's cell.
    pub fn to_geographic(
        &self,
        reference: &GridReference,
    ) -> Result<GeographicCoordinate, GridError> {
        let p = reference.to_projected();
        let (e, n) = self.correction.remove(p.easting, p.northing);
        let (lon, lat) = self.pipeline.inverse(e, n)?;
        Ok(GeographicCoordinate::new(lon, lat))
    }

    /// Convert many (lon, lat) pairs. Native pipelines run in parallel.
    pub fn convert_batch(
        &self,
        coords: &[(f64, f64)],
        digits: Digits,
    ) -> Vec<Result<GridReference, GridError>> {
        match &self.pipeline {
            Pipeline::Native { datum, grid } => {
                let correction = self.correction;
                coords
                    .par_iter()
                    .map(|&(lon, lat)| {
                        let (e, n) =
                            pipeline::forward_native(datum.as_ref(), grid, lon, lat)?;
                        let (e, n) = correction.apply(e, n);
                        GridReference::from_projected(e, n, digits)
                    })
                    .collect()
            }
            Pipeline::Proj4rs(_) => coords
                .iter()
                .map(|&(lon, lat)| self.convert(lon, lat, digits))
                .collect(),
        }
    }

    /// Convert parallel longitude and latitude arrays.
    pub fn convert_arrays(
        &self,
        lons: ArrayView1<'_, f64>,
        lats: ArrayView1<'_, f64>,
        digits: Digits,
    ) -> Result<Vec<Result<GridReference, GridError>>, GridError> {
        if lons.len() != lats.len() {
            return Err(GridError::Shape(format!(
                "longitude and latitude must have same length, got {} and {}",
                lons.len(),
                lats.len()
            )));
        }
        let coords: Vec<(f64, f64)> = lons.iter().copied().zip(lats.iter().copied()).collect();
        Ok(self.convert_batch(&coords, digits))
    }
}

impl Default for GridReferenceConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Grid reference for (lon, lat) in degrees with the default converter.
pub fn to_grid_reference(lon: f64, lat: f64, digits: u8) -> Result<GridReference, GridError> {
    GridReferenceConverter::new().convert(lon, lat, Digits::new(digits)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn digits(d: u8) -> Digits {
        Digits::new(d).unwrap()
    }

    #[test]
    fn test_true_origin_before_correction() {
        let conv = GridReferenceConverter::new().with_correction(Correction::NONE);
        let p = conv.project(-2.0, 49.0).unwrap();
        assert_relative_eq!(p.easting, 400_000.0, epsilon = 1e-6);
        assert_relative_eq!(p.northing, -100_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_true_origin_is_out_of_range() {
        // N0 = -100 km puts the true origin south of the lettered squares
        let conv = GridReferenceConverter::new();
        assert!(matches!(
            conv.convert(-2.0, 49.0, digits(8)),
            Err(GridError::OutOfRange { .. })
        ));
        assert_eq!(conv.display(-2.0, 49.0), "");
    }

    #[test]
    fn test_gulf_of_guinea_is_out_of_range() {
        let conv = GridReferenceConverter::new();
        for d in [2, 4, 6, 8, 10] {
            assert!(matches!(
                conv.convert(0.0, 0.0, digits(d)),
                Err(GridError::OutOfRange { .. })
            ));
        }
        assert_eq!(conv.display(0.0, 0.0), "");
    }

    #[test]
    fn test_map_display_fixtures() {
        let conv = GridReferenceConverter::new();
        let cases: &[(f64, f64, u8, &str)] = &[
            (-0.1275, 51.5072, 2, "TQ 3 8"),
            (-0.1275, 51.5072, 4, "TQ 30 80"),
            (-0.1275, 51.5072, 6, "TQ 300 804"),
            (-0.1275, 51.5072, 8, "TQ 3003 8041"),
            (-0.1275, 51.5072, 10, "TQ 30037 80412"),
            (-3.1883, 55.9533, 8, "NT 2590 7399"),
            (-3.1762, 51.4778, 8, "ST 1842 7613"),
            (-5.7150, 50.0657, 8, "SW 3427 2508"),
            (-3.0700, 58.6400, 8, "ND 3799 7291"),
            (-1.5491, 53.8008, 8, "SE 2979 3395"),
            (-4.2518, 55.8642, 8, "NS 5919 6573"),
            (1.7000, 52.6000, 8, "TG 5062 0671"),
            (-6.3000, 56.5000, 8, "NM 3551 4248"),
            (-3.0000, 60.5000, 8, "HT 4517 7994"),
        ];
        for &(lon, lat, d, expected) in cases {
            let r = conv.convert(lon, lat, digits(d)).unwrap();
            assert_eq!(r.to_string(), expected, "({lon}, {lat}) at {d} digits");
        }
    }

    #[test]
    fn test_format_widths() {
        let conv = GridReferenceConverter::new();
        let r = conv.convert(1.7, 52.6, digits(8)).unwrap();
        let text = r.to_string();
        let parts: Vec<&str> = text.split(' ').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 2);
        assert_eq!(parts[1].len(), 4);
        assert_eq!(parts[2], "0671");

        let r = conv.convert(1.7, 52.6, digits(10)).unwrap();
        assert_eq!(r.to_string(), "TG 50627 06715");
    }

    #[test]
    fn test_idempotent() {
        let conv = GridReferenceConverter::new();
        let a = conv.convert(-3.1762, 51.4778, digits(10)).unwrap();
        let b = conv.convert(-3.1762, 51.4778, digits(10)).unwrap();
        assert_eq!(a, b);
        assert_eq!(conv.display(-3.1762, 51.4778), conv.display(-3.1762, 51.4778));
    }

    #[test]
    fn test_os_worked_example_without_correction() {
        let conv = GridReferenceConverter::new().with_correction(Correction::NONE);
        let lon = 1.0 + 43.0 / 60.0 + 4.5177 / 3600.0;
        let lat = 52.0 + 39.0 / 60.0 + 27.2531 / 3600.0;
        let r = conv.convert(lon, lat, digits(10)).unwrap();
        assert_eq!(r.to_string(), "TG 51409 13177");
    }

    #[test]
    fn test_empirical_offset_is_a_known_deviation() {
        // The +100 m easting offset is not part of the OS formula; it is
        // applied on purpose and must stay visible in the output.
        assert_relative_eq!(EMPIRICAL_EASTING_OFFSET_METERS, 100.0);
        let raw = GridReferenceConverter::new().with_correction(Correction::NONE);
        let map = GridReferenceConverter::new();
        let a = raw.project(-0.1275, 51.5072).unwrap();
        let b = map.project(-0.1275, 51.5072).unwrap();
        assert_relative_eq!(b.easting - a.easting, 100.0, epsilon = 1e-9);
        assert_relative_eq!(b.northing, a.northing);
        assert_eq!(raw.display(-0.1275, 51.5072), "TQ 2993 8041");
        assert_eq!(map.display(-0.1275, 51.5072), "TQ 3003 8041");
    }

    #[test]
    fn test_northing_correction_resolution() {
        // The map readout and the accumulator form disagreed by 18 m of
        // northing. The map readout wins by default; the accumulator
        // preset stays available by name.
        assert_eq!(Correction::default(), Correction::MAP_DISPLAY);
        assert_relative_eq!(Correction::MAP_DISPLAY.northing, 0.0);
        assert_relative_eq!(ACCUMULATOR_NORTHING_OFFSET_METERS, -18.0);

        let map = GridReferenceConverter::new();
        let acc =
            GridReferenceConverter::new().with_correction(Correction::DEVICE_ACCUMULATORS);
        assert_eq!(map.display(-0.1275, 51.5072), "TQ 3003 8041");
        assert_eq!(acc.display(-0.1275, 51.5072), "TQ 3003 8039");
        let a = map.convert(-0.1275, 51.5072, digits(10)).unwrap();
        let b = acc.convert(-0.1275, 51.5072, digits(10)).unwrap();
        assert_eq!(a.to_string(), "TQ 30037 80412");
        assert_eq!(b.to_string(), "TQ 30037 80394");
    }

    #[test]
    fn test_correction_from_name() {
        assert_eq!(Correction::from_name("none"), Some(Correction::NONE));
        assert_eq!(Correction::from_name("Map"), Some(Correction::MAP_DISPLAY));
        assert_eq!(
            Correction::from_name("accumulators"),
            Some(Correction::DEVICE_ACCUMULATORS)
        );
        assert_eq!(Correction::from_name("fudge"), None);
    }

    #[test]
    fn test_wgs84_converter() {
        let conv = GridReferenceConverter::wgs84();
        assert_eq!(conv.correction(), Correction::NONE);
        let cases: &[(f64, f64, &str)] = &[
            (-0.1275, 51.5072, "TQ 30050 80358"),
            (-3.1883, 55.9533, "NT 25897 74001"),
            (-3.1762, 51.4778, "ST 18412 76083"),
            (1.7000, 52.6000, "TG 50655 06675"),
        ];
        for &(lon, lat, expected) in cases {
            let r = conv.convert(lon, lat, digits(10)).unwrap();
            assert_eq!(r.to_string(), expected, "({lon}, {lat})");
        }
    }

    #[test]
    fn test_from_config() {
        let conv = GridReferenceConverter::from_config(&ConverterConfig::default()).unwrap();
        assert_eq!(conv.correction(), Correction::MAP_DISPLAY);
        assert_eq!(conv.digits(), Digits::DEFAULT);

        let config = ConverterConfig {
            source_crs: "EPSG:4326".into(),
            correction: None,
            digits: digits(6),
        };
        let conv = GridReferenceConverter::from_config(&config).unwrap();
        assert_eq!(conv.correction(), Correction::NONE);
        assert_eq!(conv.display(-0.1275, 51.5072), "TQ 300 803");

        let config = ConverterConfig {
            source_crs: "EPSG:99999".into(),
            ..ConverterConfig::default()
        };
        assert!(matches!(
            GridReferenceConverter::from_config(&config),
            Err(GridError::Projection(_))
        ));
    }

    #[test]
    fn test_to_geographic_roundtrip() {
        for conv in [GridReferenceConverter::new(), GridReferenceConverter::wgs84()] {
            let r = conv.convert(-4.2518, 55.8642, digits(10)).unwrap();
            let corner = conv.to_geographic(&r).unwrap();
            // South-west corner of a 1 m cell: within ~1.5 m of the input
            assert_relative_eq!(corner.lon, -4.2518, epsilon = 3e-5);
            assert_relative_eq!(corner.lat, 55.8642, epsilon = 2e-5);
            let inside = conv
                .convert(corner.lon + 1e-6, corner.lat + 1e-6, digits(10))
                .unwrap();
            assert_eq!(inside, r);
        }
    }

    #[test]
    fn test_batch_matches_single() {
        let conv = GridReferenceConverter::new();
        let coords = vec![(-0.1275, 51.5072), (0.0, 0.0), (-3.1883, 55.9533)];
        let results = conv.convert_batch(&coords, digits(8));
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().to_string(), "TQ 3003 8041");
        assert!(matches!(results[1], Err(GridError::OutOfRange { .. })));
        assert_eq!(results[2].as_ref().unwrap().to_string(), "NT 2590 7399");
    }

    #[test]
    fn test_convert_arrays() {
        let conv = GridReferenceConverter::wgs84();
        let lons = array![-0.1275, 1.7];
        let lats = array![51.5072, 52.6];
        let results = conv
            .convert_arrays(lons.view(), lats.view(), digits(8))
            .unwrap();
        assert_eq!(results[0].as_ref().unwrap().to_string(), "TQ 3005 8035");
        assert_eq!(results[1].as_ref().unwrap().to_string(), "TG 5065 0667");

        let short = array![51.5072];
        assert!(matches!(
            conv.convert_arrays(lons.view(), short.view(), digits(8)),
            Err(GridError::Shape(_))
        ));
    }

    #[test]
    fn test_free_function() {
        assert_eq!(
            to_grid_reference(-0.1275, 51.5072, 8).unwrap().to_string(),
            "TQ 3003 8041"
        );
        assert!(matches!(
            to_grid_reference(-0.1275, 51.5072, 7),
            Err(GridError::InvalidDigits(7))
        ));
    }
}

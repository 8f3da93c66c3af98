//! PyO3 bindings for grid reference conversion.

use ndarray::Array1;
use numpy::PyReadonlyArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::convert::{ConverterConfig, Correction, GridReferenceConverter};
use crate::error::GridError;
use crate::gridref::{Digits, GridReference};

fn value_error(e: GridError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn build_converter(
    digits: u8,
    source_crs: &str,
    correction: Option<&str>,
) -> PyResult<GridReferenceConverter> {
    let correction = correction
        .map(|name| {
            Correction::from_name(name).ok_or_else(|| {
                PyValueError::new_err(format!("Unknown correction preset: '{name}'"))
            })
        })
        .transpose()?;
    let config = ConverterConfig {
        source_crs: source_crs.to_string(),
        correction,
        digits: Digits::new(digits).map_err(value_error)?,
    };
    GridReferenceConverter::from_config(&config).map_err(value_error)
}

/// Blank for points off the grid, error for anything else.
fn format_result(result: Result<GridReference, GridError>) -> PyResult<String> {
    match result {
        Ok(reference) => Ok(reference.to_string()),
        Err(GridError::OutOfRange { .. }) => Ok(String::new()),
        Err(e) => Err(value_error(e)),
    }
}

/// Convert a longitude/latitude (degrees) to a National Grid reference.
///
/// Args:
///     lon: Longitude in degrees.
///     lat: Latitude in degrees.
///     digits: Total figures (2, 4, 6, 8 or 10). Defaults to 8.
///     source_crs: Geographic CRS of the input. "EPSG:4277" projects directly
///         on Airy 1830, "EPSG:4326" applies a Helmert shift, anything else
///         goes through proj4rs.
///     correction: "map", "accumulators" or "none". Defaults to "map" without
///         a datum shift, "none" with one.
///
/// Returns:
///     Grid reference such as "TQ 3003 8041", or "" outside the grid.
#[pyfunction]
#[pyo3(signature = (lon, lat, digits=8, source_crs="EPSG:4277", correction=None))]
pub fn to_grid_reference(
    lon: f64,
    lat: f64,
    digits: u8,
    source_crs: &str,
    correction: Option<&str>,
) -> PyResult<String> {
    let converter = build_converter(digits, source_crs, correction)?;
    let digits = converter.digits();
    format_result(converter.convert(lon, lat, digits))
}

/// Convert arrays of longitudes and latitudes to grid references.
///
/// Args:
///     lon: 1D array of longitudes in degrees.
///     lat: 1D array of latitudes in degrees.
///     digits, source_crs, correction: as for `to_grid_reference`.
///
/// Returns:
///     List of grid reference strings ("" for points outside the grid).
#[pyfunction]
#[pyo3(signature = (lon, lat, digits=8, source_crs="EPSG:4277", correction=None))]
pub fn to_grid_references<'py>(
    py: Python<'py>,
    lon: PyReadonlyArray1<'py, f64>,
    lat: PyReadonlyArray1<'py, f64>,
    digits: u8,
    source_crs: &str,
    correction: Option<&str>,
) -> PyResult<Vec<String>> {
    // Copy inputs to owned values before releasing the GIL
    let lons: Array1<f64> = lon.as_array().to_owned();
    let lats: Array1<f64> = lat.as_array().to_owned();
    let source_crs = source_crs.to_string();
    let correction = correction.map(str::to_string);

    py.allow_threads(move || {
        let converter = build_converter(digits, &source_crs, correction.as_deref())?;
        let results = converter
            .convert_arrays(lons.view(), lats.view(), converter.digits())
            .map_err(value_error)?;
        results.into_iter().map(format_result).collect()
    })
}

/// Parse a grid reference to the easting/northing (metres) of its south-west corner.
#[pyfunction]
pub fn parse_grid_reference(text: &str) -> PyResult<(f64, f64)> {
    let reference: GridReference = text.parse().map_err(value_error)?;
    let p = reference.to_projected();
    Ok((p.easting, p.northing))
}

/// Longitude/latitude (degrees) of the south-west corner of a grid reference.
///
/// `source_crs` and `correction` select the same pipeline as `to_grid_reference`,
/// so references produced there map back to their input.
#[pyfunction]
#[pyo3(signature = (text, source_crs="EPSG:4277", correction=None))]
pub fn grid_reference_to_lonlat(
    text: &str,
    source_crs: &str,
    correction: Option<&str>,
) -> PyResult<(f64, f64)> {
    let reference: GridReference = text.parse().map_err(value_error)?;
    let converter = build_converter(reference.digits().get(), source_crs, correction)?;
    let coord = converter.to_geographic(&reference).map_err(value_error)?;
    Ok((coord.lon, coord.lat))
}

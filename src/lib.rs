#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod convert;
pub mod coord;
pub mod error;
pub mod gridref;
pub mod proj;
#[cfg(feature = "python")]
mod py;

pub use convert::{to_grid_reference, Correction, ConverterConfig, GridReferenceConverter};
pub use coord::{GeographicCoordinate, ProjectedCoordinate};
pub use error::{GridError, ProjError};
pub use gridref::{zero_pad, Digits, GridReference};

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pymodule]
fn _rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    py::register(m)?;
    Ok(())
}

use pyo3::prelude::*;

mod gridref;

/// Register all Python-visible functions and types.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(gridref::to_grid_reference, m)?)?;
    m.add_function(wrap_pyfunction!(gridref::to_grid_references, m)?)?;
    m.add_function(wrap_pyfunction!(gridref::parse_grid_reference, m)?)?;
    m.add_function(wrap_pyfunction!(gridref::grid_reference_to_lonlat, m)?)?;
    Ok(())
}

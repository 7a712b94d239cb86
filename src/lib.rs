use pyo3::prelude::*;

use config::PySetbackConfig;
use measure::py_measure_setbacks;
use registry::PySegmentRegistry;

pub mod config;
pub mod error;
pub mod measure;
pub mod registry;

/// A Python module implemented in Rust.
#[pymodule]
fn setback(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PySetbackConfig>()?;
    m.add_class::<PySegmentRegistry>()?;
    m.add_function(wrap_pyfunction!(py_measure_setbacks, m)?)?;
    Ok(())
}

#[cfg(feature = "stubgen")]
pyo3_stub_gen::define_stub_info_gatherer!(stub_info);

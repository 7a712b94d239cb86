use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use setback_core::{SetbackConfig, SidePolicy};

use crate::error::to_py_err;

fn parse_policy(name: &str) -> PyResult<SidePolicy> {
    match name {
        "shared_boundary" => Ok(SidePolicy::SharedBoundary),
        "street_corroborated" => Ok(SidePolicy::StreetCorroborated),
        other => Err(PyValueError::new_err(format!(
            "Unknown side policy '{other}', expected 'shared_boundary' or 'street_corroborated'"
        ))),
    }
}

fn policy_name(policy: SidePolicy) -> &'static str {
    match policy {
        SidePolicy::SharedBoundary => "shared_boundary",
        SidePolicy::StreetCorroborated => "street_corroborated",
    }
}

/// SetbackConfig
///
/// Parameters of a setback run. Validated on construction.
///
/// Example:
///
/// .. code-block:: python
///
///     config = SetbackConfig(max_sides=4, side_policy="shared_boundary")
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyclass)]
#[pyclass(name = "SetbackConfig")]
pub struct PySetbackConfig {
    pub(crate) inner: SetbackConfig,
}

#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pymethods)]
#[pymethods]
impl PySetbackConfig {
    #[new]
    #[pyo3(signature = (
        max_sides = 4,
        coordinate_tolerance = 1e-6,
        parallel_tolerance_deg = 10.0,
        side_policy = "shared_boundary",
        drop_empty_records = false,
        max_distance = None,
        search_radius = 300.0,
        max_candidates = 30,
        source_date = None,
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        max_sides: usize,
        coordinate_tolerance: f64,
        parallel_tolerance_deg: f64,
        side_policy: &str,
        drop_empty_records: bool,
        max_distance: Option<f64>,
        search_radius: f64,
        max_candidates: usize,
        source_date: Option<NaiveDate>,
    ) -> PyResult<Self> {
        let inner = SetbackConfig {
            max_sides,
            coordinate_tolerance,
            parallel_tolerance_deg,
            side_policy: parse_policy(side_policy)?,
            drop_empty_records,
            max_distance,
            search_radius,
            max_candidates,
            source_date,
        };
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    #[getter]
    fn max_sides(&self) -> usize {
        self.inner.max_sides
    }

    #[getter]
    fn coordinate_tolerance(&self) -> f64 {
        self.inner.coordinate_tolerance
    }

    #[getter]
    fn side_policy(&self) -> &'static str {
        policy_name(self.inner.side_policy)
    }

    #[getter]
    fn max_distance(&self) -> Option<f64> {
        self.inner.max_distance
    }

    #[getter]
    fn source_date(&self) -> Option<NaiveDate> {
        self.inner.source_date
    }

    fn __repr__(&self) -> String {
        format!(
            "SetbackConfig(max_sides={}, side_policy='{}', drop_empty_records={})",
            self.inner.max_sides,
            policy_name(self.inner.side_policy),
            self.inner.drop_empty_records
        )
    }
}

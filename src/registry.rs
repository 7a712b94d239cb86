use geo::{Geometry, MultiPolygon};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use setback_core::{ParcelId, Segment, SegmentId, SegmentRegistry};
use wkt::TryFromWkt;

use crate::error::to_py_err;

fn parse_parcel(parcel_id: ParcelId, wkt: &str) -> PyResult<MultiPolygon<f64>> {
    let geometry = Geometry::<f64>::try_from_wkt_str(wkt)
        .map_err(|e| PyValueError::new_err(format!("Parcel {parcel_id}: invalid WKT: {e}")))?;
    match geometry {
        Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon])),
        Geometry::MultiPolygon(multi) => Ok(multi),
        _ => Err(PyValueError::new_err(format!(
            "Parcel {parcel_id}: expected a POLYGON or MULTIPOLYGON"
        ))),
    }
}

/// SegmentRegistry
///
/// Parcel boundary segments with their shared-boundary flags. Every setback
/// classification is backed by this registry.
///
/// Example:
///
/// .. code-block:: python
///
///     registry = SegmentRegistry.from_wkt([(1, "POLYGON((0 0,50 0,50 50,0 50,0 0))")])
///     geojson = registry.to_geojson()
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyclass)]
#[pyclass(name = "SegmentRegistry")]
pub struct PySegmentRegistry {
    pub(crate) registry: SegmentRegistry,
}

#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pymethods)]
#[pymethods]
impl PySegmentRegistry {
    /// Decompose parcel polygons given as `(parcel_id, wkt)` pairs
    ///
    /// Raises
    /// ------
    /// ValueError
    ///     If a geometry is not a polygon
    /// RuntimeError
    ///     If no usable segment can be produced
    #[staticmethod]
    #[pyo3(signature = (parcels, tolerance = 1e-6))]
    pub fn from_wkt(py: Python<'_>, parcels: Vec<(ParcelId, String)>, tolerance: f64) -> PyResult<Self> {
        let polygons = parcels
            .iter()
            .map(|(parcel_id, wkt)| Ok((*parcel_id, parse_parcel(*parcel_id, wkt)?)))
            .collect::<PyResult<Vec<_>>>()?;

        let registry = py
            .detach(|| SegmentRegistry::from_polygons(polygons, tolerance))
            .map_err(to_py_err)?;
        Ok(Self { registry })
    }

    /// Build from precomputed `(segment_id, parcel_id, shared_boundary, bearing)` rows
    #[staticmethod]
    pub fn from_rows(rows: Vec<(SegmentId, Option<ParcelId>, bool, Option<f64>)>) -> PyResult<Self> {
        let segments = rows
            .into_iter()
            .map(|(id, parcel_id, shared, bearing)| {
                let segment = Segment::new(id, parcel_id, shared);
                match bearing.filter(|b| b.is_finite()) {
                    Some(bearing) => segment.with_bearing(bearing),
                    None => segment,
                }
            })
            .collect();
        let registry = SegmentRegistry::from_segments(segments).map_err(to_py_err)?;
        Ok(Self { registry })
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn shared_count(&self) -> usize {
        self.registry.shared_count()
    }

    /// `(segment_id, parcel_id, shared_boundary, bearing)` for every segment
    pub fn rows(&self) -> Vec<(SegmentId, Option<ParcelId>, bool, Option<f64>)> {
        self.registry
            .iter()
            .map(|s| (s.id, s.parcel_id, s.shared_boundary, s.bearing))
            .collect()
    }

    /// `(parcel_id, segment_id)` membership pairs, neighbours of shared
    /// boundaries included
    pub fn members(&self) -> Vec<(ParcelId, SegmentId)> {
        self.registry.member_segments().pairs()
    }

    /// Segments with geometry as a GeoJSON FeatureCollection string
    pub fn to_geojson(&self) -> PyResult<String> {
        self.registry.to_geojson_string().map_err(to_py_err)
    }

    fn __len__(&self) -> usize {
        self.registry.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "SegmentRegistry with {} segments, {} shared",
            self.registry.len(),
            self.registry.shared_count()
        )
    }
}

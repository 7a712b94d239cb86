use pyo3::prelude::*;
use pyo3::types::PyDict;
use setback_core::loading::record_headers;
use setback_core::prelude::*;

use crate::config::PySetbackConfig;
use crate::error::to_py_err;
use crate::registry::PySegmentRegistry;

type NearTuple = (BuildingId, Option<SegmentId>, Option<f64>, Option<u32>);
type StreetTuple = (SegmentId, String, Option<bool>, Option<f64>);

/// One dict per record, keyed like the output table with -1 for absent slots
fn record_to_py<'py>(
    py: Python<'py>,
    headers: &[String],
    record: &AggregatedRecord,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    let mut keys = headers.iter();
    if let Some(key) = keys.next() {
        dict.set_item(key, record.building_id)?;
    }
    for side in Side::ALL {
        for slot in record.slots(side) {
            let (Some(id_key), Some(dist_key)) = (keys.next(), keys.next()) else {
                break;
            };
            match slot {
                Some(slot) => {
                    dict.set_item(id_key, slot.segment_id)?;
                    dict.set_item(dist_key, slot.distance)?;
                }
                None => {
                    dict.set_item(id_key, SENTINEL)?;
                    dict.set_item(dist_key, SENTINEL as f64)?;
                }
            }
        }
    }
    Ok(dict)
}

fn summary_to_py<'py>(py: Python<'py>, statistic: &SummaryStatistic) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("side", statistic.side.label())?;
    dict.set_item("sum", statistic.sum)?;
    dict.set_item("count", statistic.count)?;
    dict.set_item("mean", statistic.mean)?;
    Ok(dict)
}

/// Measure building setbacks
///
/// Parameters
/// ----------
/// registry : SegmentRegistry
///     Parcel boundary segments
/// buildings : list[tuple[int, int | None]]
///     `(building_id, parcel_id)` intersection pairs; a building intersecting
///     several parcels gets an empty record
/// candidates : list[tuple[int, int | None, float | None, int | None]]
///     Near table rows `(building_id, segment_id, distance, rank)`
/// config : SetbackConfig, optional
/// members : list[tuple[int, int]], optional
///     `(parcel_id, segment_id)` pairs, derived from the registry if omitted
/// streets : list[tuple[int, str, bool | None, float | None]], optional
///     `(segment_id, street_name, is_parallel, street_bearing)` rows
///
/// Returns
/// -------
/// tuple[list[dict], list[dict]]
///     Records keyed like the output table, and the two summary rows
///
/// Raises
/// ------
/// ValueError
///     If the configuration is invalid
/// RuntimeError
///     If the registry cannot back the classification
///
/// Notes
/// -----
/// The function releases the GIL while measuring.
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyfunction)]
#[pyfunction(name = "measure_setbacks")]
#[pyo3(signature = (registry, buildings, candidates, config = None, members = None, streets = None))]
pub fn py_measure_setbacks<'py>(
    py: Python<'py>,
    registry: &PySegmentRegistry,
    buildings: Vec<(BuildingId, Option<ParcelId>)>,
    candidates: Vec<NearTuple>,
    config: Option<&PySetbackConfig>,
    members: Option<Vec<(ParcelId, SegmentId)>>,
    streets: Option<Vec<StreetTuple>>,
) -> PyResult<(Vec<Bound<'py, PyDict>>, Vec<Bound<'py, PyDict>>)> {
    let config = config.map(|c| c.inner.clone()).unwrap_or_default();
    let registry = &registry.registry;

    let report = py
        .detach(|| {
            let buildings = BuildingParcels::from_intersections(buildings);
            let candidates: CandidateTable = candidates
                .into_iter()
                .map(|(building_id, segment_id, distance, rank)| NearRow {
                    building_id,
                    segment_id,
                    distance,
                    rank,
                })
                .collect();
            let members: Option<ParcelMembers> = members.map(|pairs| pairs.into_iter().collect());
            let streets: Option<StreetTable> = streets.map(|rows| {
                rows.into_iter()
                    .map(|(segment, street_name, is_parallel, street_bearing)| {
                        (
                            segment,
                            StreetAdjacency {
                                street_name,
                                is_parallel,
                                street_bearing,
                            },
                        )
                    })
                    .collect()
            });

            let mut inputs = PipelineInputs::new(registry, &buildings, &candidates);
            if let Some(members) = &members {
                inputs = inputs.with_members(members);
            }
            if let Some(streets) = &streets {
                inputs = inputs.with_streets(streets);
            }
            measure_setbacks::<DEFAULT_SIDE_SLOTS>(&inputs, &config)
        })
        .map_err(to_py_err)?;

    let headers = record_headers::<DEFAULT_SIDE_SLOTS>();
    let records = report
        .records
        .iter()
        .map(|record| record_to_py(py, &headers, record))
        .collect::<PyResult<Vec<_>>>()?;
    let summary = report
        .summary
        .iter()
        .map(|statistic| summary_to_py(py, statistic))
        .collect::<PyResult<Vec<_>>>()?;
    Ok((records, summary))
}

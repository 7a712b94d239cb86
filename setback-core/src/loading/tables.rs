use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::de::{deserialize_flag, deserialize_optional_flag};
use crate::{
    BuildingId, Error, ParcelId, SegmentId,
    classify::{StreetAdjacency, StreetTable},
    model::Segment,
    ownership::{BuildingParcels, ParcelMembers},
    registry::SegmentRegistry,
};

/// Segment with a precomputed shared-boundary flag
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SegmentRow {
    pub segment_id: SegmentId,
    pub parcel_id: Option<ParcelId>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub shared_boundary: bool,
    #[serde(default)]
    pub bearing: Option<f64>,
}

/// Parcel polygon as well-known text
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParcelRow {
    pub parcel_id: ParcelId,
    pub wkt: String,
}

/// One building/parcel intersection
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BuildingParcelRow {
    pub building_id: BuildingId,
    pub parcel_id: Option<ParcelId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MemberRow {
    pub parcel_id: ParcelId,
    pub segment_id: SegmentId,
}

/// Street found near a segment
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreetRow {
    pub segment_id: SegmentId,
    pub street_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub is_parallel: Option<bool>,
    #[serde(default)]
    pub street_bearing: Option<f64>,
}

/// Reads a CSV table, skipping rows that cannot be parsed
///
/// # Errors
///
/// Returns an error if the file cannot be opened or has no readable header
pub fn read_table<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
{
    read_table_from_reader(open(path)?)
}

fn open(path: &Path) -> Result<File, Error> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    Ok(file)
}

/// Reads a table that shared-boundary flags are derived from
///
/// Unlike [`read_table`], a single unreadable row fails the whole table.
///
/// # Errors
///
/// Returns [`Error::Registry`] naming the first unreadable row, or an I/O
/// error if the file cannot be opened
pub fn read_registry_table<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
{
    read_registry_table_from_reader(open(path)?)
}

/// Strict counterpart of [`read_table_from_reader`]
///
/// # Errors
///
/// Returns [`Error::Registry`] naming the first unreadable row
pub fn read_registry_table_from_reader<T, R>(reader: R) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    reader.headers()?;

    reader
        .deserialize()
        .enumerate()
        .map(|(idx, result)| {
            result.map_err(|e| {
                let line = e.position().map_or(idx as u64 + 2, csv::Position::line);
                Error::Registry(format!("unreadable row on line {line}: {e}"))
            })
        })
        .collect()
}

/// Reads a CSV table from any reader, skipping rows that cannot be parsed
///
/// # Errors
///
/// Returns an error if the header cannot be read
pub fn read_table_from_reader<T, R>(reader: R) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    reader.headers()?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.deserialize() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                warn!("Skipping unreadable row: {e}");
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {skipped} unreadable rows");
    }
    rows.shrink_to_fit();
    Ok(rows)
}

/// Builds the registry from a precomputed segment table
///
/// # Errors
///
/// Fails closed like [`SegmentRegistry::from_segments`]
pub fn registry_from_rows(rows: Vec<SegmentRow>) -> Result<SegmentRegistry, Error> {
    let segments = rows
        .into_iter()
        .map(|row| {
            let segment = Segment::new(row.segment_id, row.parcel_id, row.shared_boundary);
            match row.bearing.filter(|b| b.is_finite()) {
                Some(bearing) => segment.with_bearing(bearing),
                None => segment,
            }
        })
        .collect();
    SegmentRegistry::from_segments(segments)
}

pub fn building_parcels_from_rows(rows: &[BuildingParcelRow]) -> BuildingParcels {
    BuildingParcels::from_intersections(rows.iter().map(|row| (row.building_id, row.parcel_id)))
}

pub fn members_from_rows(rows: &[MemberRow]) -> ParcelMembers {
    rows.iter().map(|row| (row.parcel_id, row.segment_id)).collect()
}

pub fn street_table_from_rows(rows: Vec<StreetRow>) -> StreetTable {
    rows.into_iter()
        .map(|row| {
            (
                row.segment_id,
                StreetAdjacency {
                    street_name: row.street_name,
                    is_parallel: row.is_parallel,
                    street_bearing: row.street_bearing,
                },
            )
        })
        .collect()
}

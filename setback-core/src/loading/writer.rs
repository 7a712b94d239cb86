use std::io::Write;

use super::tables::{MemberRow, SegmentRow};
use crate::{
    Error, SENTINEL,
    model::{AggregatedRecord, Side, SideSlot},
    ownership::ParcelMembers,
    registry::SegmentRegistry,
    report::SummaryStatistic,
};

/// Column names of the aggregated record table for `N` slots per side
pub fn record_headers<const N: usize>() -> Vec<String> {
    let mut headers = vec!["BUILDING_ID".to_string()];
    for side in Side::ALL {
        let prefix = side.column_prefix();
        for slot in 1..=N {
            headers.push(format!("{prefix}_{slot}_SEGMENT_ID"));
            headers.push(format!("{prefix}_{slot}_DIST"));
        }
    }
    headers
}

fn slot_fields(slot: Option<&SideSlot>) -> [String; 2] {
    match slot {
        Some(slot) => [slot.segment_id.to_string(), slot.distance.to_string()],
        None => [SENTINEL.to_string(), SENTINEL.to_string()],
    }
}

/// Writes one row per record, absent slots as the sentinel
///
/// # Errors
///
/// Returns an error if writing fails
pub fn write_records<W, const N: usize>(writer: W, records: &[AggregatedRecord<N>]) -> Result<(), Error>
where
    W: Write,
{
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(record_headers::<N>())?;
    for record in records {
        let mut row = Vec::with_capacity(1 + 4 * N);
        row.push(record.building_id.to_string());
        for side in Side::ALL {
            for slot in record.slots(side) {
                row.extend(slot_fields(slot.as_ref()));
            }
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the summary table; an empty mean is written as `no data`
///
/// # Errors
///
/// Returns an error if writing fails
pub fn write_summary<W: Write>(writer: W, summary: &[SummaryStatistic]) -> Result<(), Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["side", "sum", "count", "mean"])?;
    for statistic in summary {
        writer.write_record([
            statistic.side.label().to_string(),
            statistic.sum.to_string(),
            statistic.count.to_string(),
            statistic.mean_label(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the registry as a segment table and, when given, the parcel
/// membership table derived from it
///
/// # Errors
///
/// Returns an error if writing fails
pub fn write_segments<W: Write, M: Write>(
    writer: W,
    registry: &SegmentRegistry,
    members: Option<M>,
) -> Result<(), Error> {
    let mut segments = csv::Writer::from_writer(writer);
    for segment in registry.iter() {
        segments.serialize(SegmentRow {
            segment_id: segment.id,
            parcel_id: segment.parcel_id,
            shared_boundary: segment.shared_boundary,
            bearing: segment.bearing,
        })?;
    }
    segments.flush()?;

    if let Some(members_writer) = members {
        write_members(members_writer, &registry.member_segments())?;
    }
    Ok(())
}

fn write_members<W: Write>(writer: W, members: &ParcelMembers) -> Result<(), Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for (parcel_id, segment_id) in members.pairs() {
        writer.serialize(MemberRow {
            parcel_id,
            segment_id,
        })?;
    }
    writer.flush()?;
    Ok(())
}

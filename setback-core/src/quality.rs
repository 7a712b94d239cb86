//! Removal of implausible aggregated records
//!
//! Too many filled slots usually means the near search reached far segments
//! around a complex footprint; a zero distance means the footprint overlaps
//! the boundary. Neither is corrected, the record is dropped.

use log::{debug, info};

use crate::model::AggregatedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    TooManySides { count: usize },
    ZeroDistance,
}

/// Records that survived the filter plus drop counts per reason
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport<const N: usize> {
    pub retained: Vec<AggregatedRecord<N>>,
    pub too_many_sides: usize,
    pub zero_distance: usize,
}

impl<const N: usize> QualityReport<N> {
    pub fn dropped(&self) -> usize {
        self.too_many_sides + self.zero_distance
    }
}

/// Checks one record against the plausibility rules
pub fn check<const N: usize>(record: &AggregatedRecord<N>, max_sides: usize) -> Result<(), DropReason> {
    let count = record.filled_count();
    if count > max_sides {
        return Err(DropReason::TooManySides { count });
    }
    if record.distances().any(|distance| distance == 0.0) {
        return Err(DropReason::ZeroDistance);
    }
    Ok(())
}

pub fn quality_filter<const N: usize>(
    records: Vec<AggregatedRecord<N>>,
    max_sides: usize,
) -> QualityReport<N> {
    let total = records.len();
    let mut report = QualityReport {
        retained: Vec::with_capacity(total),
        too_many_sides: 0,
        zero_distance: 0,
    };

    for record in records {
        match check(&record, max_sides) {
            Ok(()) => report.retained.push(record),
            Err(DropReason::TooManySides { count }) => {
                debug!(
                    "Dropping building {}: {count} sides exceed the limit of {max_sides}",
                    record.building_id
                );
                report.too_many_sides += 1;
            }
            Err(DropReason::ZeroDistance) => {
                debug!(
                    "Dropping building {}: zero setback suggests overlapping geometry",
                    record.building_id
                );
                report.zero_distance += 1;
            }
        }
    }

    info!(
        "Quality filter retained {} of {total} records ({} with too many sides, {} with zero distance)",
        report.retained.len(),
        report.too_many_sides,
        report.zero_distance
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Side, SideSlot};

    fn record(facing: &[f64], other: &[f64]) -> AggregatedRecord<4> {
        let mut record = AggregatedRecord::empty(1);
        let mut id = 0;
        for (side, distances) in [(Side::FacingStreet, facing), (Side::OtherSide, other)] {
            for &distance in distances {
                id += 1;
                record.push(side, SideSlot { segment_id: id, distance });
            }
        }
        record
    }

    #[test]
    fn boundary_count_is_kept() {
        assert_eq!(check(&record(&[1.0, 2.0], &[3.0, 4.0]), 4), Ok(()));
    }

    #[test]
    fn over_limit_is_dropped() {
        assert_eq!(
            check(&record(&[1.0, 2.0, 3.0], &[3.0, 4.0]), 4),
            Err(DropReason::TooManySides { count: 5 })
        );
    }

    #[test]
    fn zero_distance_is_dropped() {
        assert_eq!(check(&record(&[0.0], &[]), 4), Err(DropReason::ZeroDistance));
    }

    #[test]
    fn empty_record_passes() {
        assert_eq!(check(&record(&[], &[]), 4), Ok(()));
    }

    #[test]
    fn report_counts_reasons() {
        let report = quality_filter(
            vec![
                record(&[1.0], &[2.0]),
                record(&[0.0], &[]),
                record(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]),
            ],
            4,
        );
        assert_eq!(report.retained.len(), 1);
        assert_eq!(report.zero_distance, 1);
        assert_eq!(report.too_many_sides, 1);
        assert_eq!(report.dropped(), 2);
    }
}

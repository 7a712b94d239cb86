//! Per-building aggregation into fixed-width records
//!
//! Each building's candidates are walked in ascending distance (segment id
//! breaking ties). A candidate lands in the first free slot of its side; the
//! first placement of a segment wins and later rows for the same segment are
//! skipped. Once a side is full, its remaining candidates are discarded.

use std::collections::BTreeSet;

use hashbrown::HashSet;
use itertools::Itertools;
use log::info;
use rayon::prelude::*;

use crate::{
    BuildingId,
    model::{AggregatedRecord, ClassifiedCandidate, SideSlot},
};

/// Aggregates classified candidates into one record per building
///
/// Every building in `buildings` yields a record, all-absent when it has no
/// candidates, unless `drop_empty` is set. Candidates of buildings outside
/// `buildings` are ignored. Records are ordered by building id.
pub fn aggregate<const N: usize>(
    buildings: &BTreeSet<BuildingId>,
    classified: &[ClassifiedCandidate],
    drop_empty: bool,
) -> Vec<AggregatedRecord<N>> {
    let groups = classified
        .iter()
        .into_group_map_by(|c| c.candidate.building_id);

    let records: Vec<AggregatedRecord<N>> = buildings
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|building_id| {
            let candidates = groups.get(&building_id).map(Vec::as_slice).unwrap_or_default();
            aggregate_building(building_id, candidates)
        })
        .filter(|record| !(drop_empty && record.is_empty()))
        .collect();

    info!(
        "Aggregated {} buildings into {} records ({} without any setback)",
        buildings.len(),
        records.len(),
        records.iter().filter(|r| r.is_empty()).count()
    );
    records
}

/// Collapses one building's candidates into a record
pub fn aggregate_building<const N: usize>(
    building_id: BuildingId,
    candidates: &[&ClassifiedCandidate],
) -> AggregatedRecord<N> {
    let mut record = AggregatedRecord::empty(building_id);
    let mut placed = HashSet::new();

    let ordered = candidates
        .iter()
        .sorted_by(|a, b| a.candidate.processing_order(&b.candidate));

    for classified in ordered {
        let candidate = &classified.candidate;
        if placed.contains(&candidate.segment_id) {
            continue;
        }
        let slot = SideSlot {
            segment_id: candidate.segment_id,
            distance: candidate.distance,
        };
        if record.push(classified.side, slot) {
            placed.insert(candidate.segment_id);
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Candidate, Side};

    fn classified(segment_id: i64, distance: f64, side: Side) -> ClassifiedCandidate {
        ClassifiedCandidate {
            candidate: Candidate::new(1, segment_id, distance, 0),
            side,
            street_corroborated: false,
        }
    }

    fn run<const N: usize>(rows: &[ClassifiedCandidate]) -> AggregatedRecord<N> {
        let refs: Vec<&ClassifiedCandidate> = rows.iter().collect();
        aggregate_building(1, &refs)
    }

    #[test]
    fn slots_ascend_by_distance() {
        let rows = vec![
            classified(1, 9.0, Side::FacingStreet),
            classified(2, 3.0, Side::FacingStreet),
            classified(3, 6.0, Side::OtherSide),
        ];
        let record = run::<4>(&rows);
        let facing: Vec<_> = record.filled(Side::FacingStreet).map(|s| s.segment_id).collect();
        assert_eq!(facing, vec![2, 1]);
        assert_eq!(record.other_side[0].unwrap().segment_id, 3);
        assert!(record.other_side[1].is_none());
    }

    #[test]
    fn first_placement_wins_across_sides() {
        // Same segment seen with inconsistent labels
        let rows = vec![
            classified(5, 4.0, Side::OtherSide),
            classified(5, 2.0, Side::FacingStreet),
        ];
        let record = run::<4>(&rows);
        assert_eq!(record.filled_count(), 1);
        assert_eq!(record.facing_street[0].unwrap().distance, 2.0);
    }

    #[test]
    fn equal_distances_order_by_segment_id() {
        let rows = vec![
            classified(30, 5.0, Side::OtherSide),
            classified(10, 5.0, Side::OtherSide),
            classified(20, 5.0, Side::OtherSide),
        ];
        let record = run::<2>(&rows);
        let ids: Vec<_> = record.filled(Side::OtherSide).map(|s| s.segment_id).collect();
        assert_eq!(ids, vec![10, 20]);
    }

    #[test]
    fn rejected_segment_can_still_fill_other_side() {
        // Facing side is full when segment 3 arrives as facing; a later
        // other-side row for segment 3 is still placed
        let rows = vec![
            classified(1, 1.0, Side::FacingStreet),
            classified(3, 2.0, Side::FacingStreet),
            classified(3, 2.5, Side::OtherSide),
        ];
        let record = run::<1>(&rows);
        assert_eq!(record.facing_street[0].unwrap().segment_id, 1);
        assert_eq!(record.other_side[0].unwrap().segment_id, 3);
    }

    #[test]
    fn empty_buildings_are_kept_or_dropped() {
        let buildings: BTreeSet<BuildingId> = [1, 2].into_iter().collect();
        let rows = vec![classified(1, 4.0, Side::FacingStreet)];

        let kept = aggregate::<4>(&buildings, &rows, false);
        assert_eq!(kept.len(), 2);
        assert!(kept[1].is_empty());

        let dropped = aggregate::<4>(&buildings, &rows, true);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].building_id, 1);
    }
}

use geo::{MultiPolygon, polygon};
use setback_core::prelude::*;

fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: x, y: y),
        (x: x + size, y: y),
        (x: x + size, y: y + size),
        (x: x, y: y + size),
        (x: x, y: y),
    ]])
}

fn two_lots() -> Vec<(ParcelId, MultiPolygon<f64>)> {
    vec![(1, square(0.0, 0.0, 50.0)), (2, square(50.0, 0.0, 50.0))]
}

/// Registry with segments 1..=4 facing street and 11..=14 shared, all owned
/// by parcel 100
fn flagged_registry() -> SegmentRegistry {
    let mut segments: Vec<Segment> = (1..=4).map(|id| Segment::new(id, Some(100), false)).collect();
    segments.extend((11..=14).map(|id| Segment::new(id, Some(100), true)));
    SegmentRegistry::from_segments(segments).unwrap()
}

fn resolved(building: BuildingId, parcel: ParcelId) -> BuildingParcels {
    BuildingParcels::from_intersections(vec![(building, Some(parcel))])
}

#[test]
fn scenario_a_shared_lot_line_is_flagged_on_both_parcels() {
    let segments = SegmentRegistry::decompose(two_lots(), 1e-6).unwrap();
    assert_eq!(segments.len(), 8);

    let shared: Vec<&Segment> = segments.iter().filter(|s| s.shared_boundary).collect();
    assert_eq!(shared.len(), 2);
    assert_eq!(shared[0].parcel_id, Some(1));
    assert_eq!(shared[1].parcel_id, Some(2));
    for segment in &shared {
        let line = segment.geometry.unwrap();
        assert!((line.start.x - 50.0).abs() < 1e-9 && (line.end.x - 50.0).abs() < 1e-9);
    }
    assert_eq!(segments.iter().filter(|s| !s.shared_boundary).count(), 6);
}

#[test]
fn scenario_a_registry_keeps_one_representative() {
    let registry = SegmentRegistry::from_polygons(two_lots(), 1e-6).unwrap();
    assert_eq!(registry.len(), 7);
    assert_eq!(registry.shared_count(), 1);

    let shared = registry.iter().find(|s| s.shared_boundary).unwrap();
    assert_eq!(shared.parcel_id, Some(1));
    assert_eq!(shared.adjacent_parcels, vec![2]);

    let members = registry.member_segments();
    assert!(members.contains(2, shared.id));
    assert_eq!(members.segments_of(1).unwrap().len(), 4);
    assert_eq!(members.segments_of(2).unwrap().len(), 4);
}

#[test]
fn scenario_b_side_caps() {
    let registry = flagged_registry();
    let buildings = resolved(7, 100);
    let candidates: CandidateTable = vec![
        Candidate::new(7, 1, 21.0, 1),
        Candidate::new(7, 11, 5.0, 2),
        Candidate::new(7, 2, 22.0, 3),
        Candidate::new(7, 12, 6.0, 4),
        Candidate::new(7, 3, 23.0, 5),
        Candidate::new(7, 13, 7.0, 6),
        Candidate::new(7, 4, 24.0, 7),
    ]
    .into_iter()
    .collect();

    let config = SetbackConfig {
        max_sides: 8,
        ..SetbackConfig::default()
    };
    let report =
        measure_setbacks::<4>(&PipelineInputs::new(&registry, &buildings, &candidates), &config).unwrap();

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.filled(Side::FacingStreet).count(), 4);
    assert_eq!(record.filled(Side::OtherSide).count(), 3);
    assert!(record.other_side[3].is_none());
    let facing: Vec<f64> = record.filled(Side::FacingStreet).map(|s| s.distance).collect();
    assert_eq!(facing, vec![21.0, 22.0, 23.0, 24.0]);
}

#[test]
fn scenario_b_extra_facing_candidate_is_truncated() {
    let registry = SegmentRegistry::from_segments(
        (1..=6).map(|id| Segment::new(id, Some(100), false)).collect(),
    )
    .unwrap();
    let classifier = SideClassifier::new(&registry, &SetbackConfig::default());
    let classified = classifier.classify_all(
        &(1..=6)
            .map(|id| Candidate::new(7, id, 10.0 + id as f64, id as u32))
            .collect::<Vec<_>>(),
    );
    let records = aggregate::<4>(&[7].into_iter().collect(), &classified, false);
    let ids: Vec<_> = records[0].filled(Side::FacingStreet).map(|s| s.segment_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn scenario_c_duplicate_segment_collapses_to_nearest() {
    let registry = SegmentRegistry::from_segments(vec![Segment::new(7, Some(100), false)]).unwrap();
    let buildings = resolved(1, 100);
    let candidates: CandidateTable = vec![
        Candidate::new(1, 7, 12.3, 2),
        Candidate::new(1, 7, 12.0, 1),
    ]
    .into_iter()
    .collect();

    let report = measure_setbacks::<4>(
        &PipelineInputs::new(&registry, &buildings, &candidates),
        &SetbackConfig::default(),
    )
    .unwrap();

    let record = &report.records[0];
    assert_eq!(record.filled_count(), 1);
    assert_eq!(
        record.facing_street[0],
        Some(SideSlot {
            segment_id: 7,
            distance: 12.0
        })
    );
}

#[test]
fn scenario_d_unresolved_building_reports_sentinels_only() {
    let registry = flagged_registry();
    let buildings = BuildingParcels::from_intersections(vec![(1, Some(100)), (2, None)]);
    let candidates: CandidateTable = vec![
        Candidate::new(1, 1, 15.0, 1),
        Candidate::new(1, 11, 4.0, 2),
        Candidate::new(2, 2, 30.0, 1),
        Candidate::new(2, 12, 8.0, 2),
    ]
    .into_iter()
    .collect();

    let report = measure_setbacks::<4>(
        &PipelineInputs::new(&registry, &buildings, &candidates),
        &SetbackConfig::default(),
    )
    .unwrap();

    assert_eq!(report.records.len(), 2);
    let unresolved = report.records.iter().find(|r| r.building_id == 2).unwrap();
    assert!(unresolved.is_empty());

    let [facing, other] = report.summary;
    assert_eq!(facing.count, 1);
    assert_eq!(facing.sum, 15.0);
    assert_eq!(other.count, 1);
    assert_eq!(other.sum, 4.0);
}

#[test]
fn scenario_e_too_many_sides_is_removed() {
    let registry = flagged_registry();
    let buildings = resolved(3, 100);
    let candidates: CandidateTable = vec![
        Candidate::new(3, 1, 10.0, 1),
        Candidate::new(3, 2, 11.0, 2),
        Candidate::new(3, 3, 12.0, 3),
        Candidate::new(3, 11, 4.0, 4),
        Candidate::new(3, 12, 5.0, 5),
        Candidate::new(3, 13, 6.0, 6),
    ]
    .into_iter()
    .collect();

    let report = measure_setbacks::<4>(
        &PipelineInputs::new(&registry, &buildings, &candidates),
        &SetbackConfig::default(),
    )
    .unwrap();

    assert!(report.records.is_empty());
    assert_eq!(report.counts.dropped_too_many_sides, 1);
    assert_eq!(report.summary[0].mean, None);
    assert_eq!(report.summary[1].mean, None);
}

#[test]
fn empty_registry_table_fails_closed() {
    let result = SegmentRegistry::from_segments(Vec::new());
    assert!(matches!(result, Err(Error::Registry(_))));
}

#[test]
fn invalid_configuration_names_its_stage() {
    let registry = flagged_registry();
    let buildings = BuildingParcels::new();
    let candidates = CandidateTable::default();
    let config = SetbackConfig {
        max_sides: 0,
        ..SetbackConfig::default()
    };
    let err = measure_setbacks::<4>(&PipelineInputs::new(&registry, &buildings, &candidates), &config)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Stage {
            stage: Stage::Configuration,
            ..
        }
    ));
    assert!(err.to_string().starts_with("configuration stage failed"));
}

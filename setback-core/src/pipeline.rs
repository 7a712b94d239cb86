//! End-to-end setback measurement
//!
//! Registry and resolution tables are prepared by the caller; this module
//! runs ownership filtering, classification, aggregation, quality filtering
//! and reporting in that order. Per-building anomalies are absorbed, while
//! structural problems abort with the failing stage attached.

use std::borrow::Cow;

use log::info;
use serde::Serialize;

use crate::{
    aggregate::aggregate,
    candidates::CandidateTable,
    classify::{SideClassifier, StreetTable},
    config::SetbackConfig,
    error::{Error, Stage},
    model::{AggregatedRecord, Candidate},
    ownership::{BuildingParcels, OwnershipFilter, ParcelMembers},
    quality::quality_filter,
    registry::SegmentRegistry,
    report::{SummaryStatistic, summarize},
};

/// Tables consumed by [`measure_setbacks`]
#[derive(Debug, Clone, Copy)]
pub struct PipelineInputs<'a> {
    pub registry: &'a SegmentRegistry,
    pub buildings: &'a BuildingParcels,
    pub candidates: &'a CandidateTable,
    /// Parcel to member segments; derived from the registry when absent
    pub members: Option<&'a ParcelMembers>,
    /// Optional street adjacency used by the classifier
    pub streets: Option<&'a StreetTable>,
}

impl<'a> PipelineInputs<'a> {
    pub fn new(
        registry: &'a SegmentRegistry,
        buildings: &'a BuildingParcels,
        candidates: &'a CandidateTable,
    ) -> Self {
        Self {
            registry,
            buildings,
            candidates,
            members: None,
            streets: None,
        }
    }

    #[must_use]
    pub fn with_members(mut self, members: &'a ParcelMembers) -> Self {
        self.members = Some(members);
        self
    }

    #[must_use]
    pub fn with_streets(mut self, streets: &'a StreetTable) -> Self {
        self.streets = Some(streets);
        self
    }
}

/// Counts collected along the way, for run reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    pub buildings: usize,
    pub candidates: usize,
    pub discarded_rows: usize,
    pub beyond_max_distance: usize,
    pub owned_candidates: usize,
    pub rejected_by_ownership: usize,
    pub aggregated: usize,
    pub dropped_too_many_sides: usize,
    pub dropped_zero_distance: usize,
    pub retained: usize,
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct SetbackReport<const N: usize> {
    /// Quality-filtered records ordered by building id
    pub records: Vec<AggregatedRecord<N>>,
    /// Facing street first, other side second
    pub summary: [SummaryStatistic; 2],
    pub counts: RunCounts,
}

/// Runs the whole setback pipeline with `N` slots per side
///
/// # Errors
///
/// Fails when the configuration is invalid or the segment registry cannot
/// back any classification. Per-building problems never fail the run.
pub fn measure_setbacks<const N: usize>(
    inputs: &PipelineInputs<'_>,
    config: &SetbackConfig,
) -> Result<SetbackReport<N>, Error> {
    config.validate().map_err(|e| e.at(Stage::Configuration))?;
    if N == 0 {
        return Err(Error::InvalidConfig("records need at least one slot per side".to_string())
            .at(Stage::Configuration));
    }
    if inputs.registry.is_empty() {
        return Err(Error::Registry("segment registry is empty".to_string()).at(Stage::Registry));
    }

    let mut counts = RunCounts {
        buildings: inputs.candidates.buildings().len(),
        candidates: inputs.candidates.len(),
        discarded_rows: inputs.candidates.discarded(),
        ..RunCounts::default()
    };

    let candidates: Cow<'_, [Candidate]> = match config.max_distance {
        Some(max_distance) => {
            let within: Vec<Candidate> = inputs
                .candidates
                .candidates()
                .iter()
                .filter(|c| c.distance <= max_distance)
                .copied()
                .collect();
            counts.beyond_max_distance = inputs.candidates.len() - within.len();
            Cow::Owned(within)
        }
        None => Cow::Borrowed(inputs.candidates.candidates()),
    };

    let members = match inputs.members {
        Some(members) => Cow::Borrowed(members),
        None => Cow::Owned(inputs.registry.member_segments()),
    };

    let (owned, ownership) =
        OwnershipFilter::new(inputs.registry, inputs.buildings, &members).apply(&candidates);
    counts.owned_candidates = owned.len();
    counts.rejected_by_ownership = ownership.rejected();

    let mut classifier = SideClassifier::new(inputs.registry, config);
    if let Some(streets) = inputs.streets {
        classifier = classifier.with_streets(streets);
    }
    let classified = classifier.classify_all(&owned);

    let records = aggregate::<N>(
        inputs.candidates.buildings(),
        &classified,
        config.drop_empty_records,
    );
    counts.aggregated = records.len();

    let quality = quality_filter(records, config.max_sides);
    counts.dropped_too_many_sides = quality.too_many_sides;
    counts.dropped_zero_distance = quality.zero_distance;
    counts.retained = quality.retained.len();

    let summary = summarize(&quality.retained);
    for statistic in &summary {
        info!(
            "{}: {} setbacks, sum {:.2}, mean {}",
            statistic.side,
            statistic.count,
            statistic.sum,
            statistic.mean_label()
        );
    }

    Ok(SetbackReport {
        records: quality.retained,
        summary,
        counts,
    })
}

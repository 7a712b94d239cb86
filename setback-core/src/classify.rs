//! Street-facing versus interior classification
//!
//! The shared-boundary flag is authoritative: a shared segment is interior
//! no matter how close a street runs. Street adjacency only corroborates, or
//! under [`SidePolicy::StreetCorroborated`] is required for, the facing label
//! of non-shared segments.

use hashbrown::HashMap;
use log::{debug, info};
use rayon::prelude::*;

use crate::{
    SegmentId,
    config::{SetbackConfig, SidePolicy},
    model::{Candidate, ClassifiedCandidate, Segment, Side, is_parallel},
    registry::SegmentRegistry,
};

/// A named street found within the search tolerance of a segment
#[derive(Debug, Clone, PartialEq)]
pub struct StreetAdjacency {
    pub street_name: String,
    /// Parallelism decided upstream
    pub is_parallel: Option<bool>,
    /// Street bearing, used when `is_parallel` is not given
    pub street_bearing: Option<f64>,
}

/// Segment id to nearby streets
#[derive(Debug, Clone, Default)]
pub struct StreetTable {
    streets: HashMap<SegmentId, Vec<StreetAdjacency>>,
}

impl StreetTable {
    pub fn insert(&mut self, segment: SegmentId, street: StreetAdjacency) {
        self.streets.entry(segment).or_default().push(street);
    }

    pub fn streets_near(&self, segment: SegmentId) -> &[StreetAdjacency] {
        self.streets.get(&segment).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.streets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streets.is_empty()
    }
}

impl FromIterator<(SegmentId, StreetAdjacency)> for StreetTable {
    fn from_iter<T: IntoIterator<Item = (SegmentId, StreetAdjacency)>>(iter: T) -> Self {
        let mut table = Self::default();
        for (segment, street) in iter {
            table.insert(segment, street);
        }
        table
    }
}

pub struct SideClassifier<'a> {
    registry: &'a SegmentRegistry,
    streets: Option<&'a StreetTable>,
    policy: SidePolicy,
    tolerance_deg: f64,
}

impl<'a> SideClassifier<'a> {
    pub fn new(registry: &'a SegmentRegistry, config: &SetbackConfig) -> Self {
        Self {
            registry,
            streets: None,
            policy: config.side_policy,
            tolerance_deg: config.parallel_tolerance_deg,
        }
    }

    #[must_use]
    pub fn with_streets(mut self, streets: &'a StreetTable) -> Self {
        self.streets = Some(streets);
        self
    }

    /// Whether a parallel named street runs along the segment
    fn has_parallel_street(&self, segment: &Segment) -> bool {
        let Some(streets) = self.streets else {
            return false;
        };
        streets
            .streets_near(segment.id)
            .iter()
            .filter(|street| !street.street_name.trim().is_empty())
            .any(|street| match (street.is_parallel, street.street_bearing, segment.bearing) {
                (Some(parallel), _, _) => parallel,
                (None, Some(street_bearing), Some(segment_bearing)) => {
                    is_parallel(street_bearing, segment_bearing, self.tolerance_deg)
                }
                _ => false,
            })
    }

    /// Labels a candidate, or `None` if its segment is not registered
    pub fn classify(&self, candidate: Candidate) -> Option<ClassifiedCandidate> {
        let segment = self.registry.get(candidate.segment_id)?;
        let corroborated = !segment.shared_boundary && self.has_parallel_street(segment);

        let side = match (segment.shared_boundary, self.policy) {
            (true, _) => Side::OtherSide,
            (false, SidePolicy::SharedBoundary) => Side::FacingStreet,
            (false, SidePolicy::StreetCorroborated) if corroborated => Side::FacingStreet,
            (false, SidePolicy::StreetCorroborated) => Side::OtherSide,
        };

        Some(ClassifiedCandidate {
            candidate,
            side,
            street_corroborated: corroborated,
        })
    }

    /// Labels every candidate, preserving input order
    pub fn classify_all(&self, candidates: &[Candidate]) -> Vec<ClassifiedCandidate> {
        let classified: Vec<ClassifiedCandidate> = candidates
            .par_iter()
            .filter_map(|candidate| {
                let result = self.classify(*candidate);
                if result.is_none() {
                    debug!(
                        "Candidate of building {} references unknown segment {}",
                        candidate.building_id, candidate.segment_id
                    );
                }
                result
            })
            .collect();

        let facing = classified.iter().filter(|c| c.facing_street()).count();
        let corroborated = classified.iter().filter(|c| c.street_corroborated).count();
        info!(
            "Classified {} candidates: {} facing street ({} corroborated by a parallel street), {} other side",
            classified.len(),
            facing,
            corroborated,
            classified.len() - facing
        );
        classified
    }
}

//! Restricts each building's candidates to its own parcel's boundary
//!
//! Expressed as a single join over two in-memory indexes: building to
//! intended parcel, and parcel to member segment ids. Rows that fail the
//! join are dropped, never reassigned to another parcel.

use hashbrown::{HashMap, HashSet};
use log::{debug, info};
use rayon::prelude::*;

use crate::{BuildingId, ParcelId, SegmentId, model::Candidate, registry::SegmentRegistry};

/// Building to intended parcel resolution
///
/// A building maps to `None` when it intersects several parcels or its
/// parcel could not be determined.
#[derive(Debug, Clone, Default)]
pub struct BuildingParcels {
    parcels: HashMap<BuildingId, Option<ParcelId>>,
}

impl BuildingParcels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves buildings from raw (building, parcel) intersection pairs
    ///
    /// A building paired with exactly one distinct parcel resolves to it;
    /// one paired with several, or only with missing parcels, stays
    /// unresolved.
    pub fn from_intersections<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (BuildingId, Option<ParcelId>)>,
    {
        let mut seen: HashMap<BuildingId, HashSet<ParcelId>> = HashMap::new();
        for (building, parcel) in pairs {
            let entry = seen.entry(building).or_default();
            if let Some(parcel) = parcel {
                entry.insert(parcel);
            }
        }

        let parcels = seen
            .into_iter()
            .map(|(building, candidates)| {
                let resolved = if candidates.len() == 1 {
                    candidates.into_iter().next()
                } else {
                    if candidates.len() > 1 {
                        debug!(
                            "Building {building} intersects {} parcels - leaving unresolved",
                            candidates.len()
                        );
                    }
                    None
                };
                (building, resolved)
            })
            .collect::<HashMap<_, _>>();

        let resolved = Self { parcels };
        info!(
            "Resolved parcels for {} of {} buildings",
            resolved.len() - resolved.unresolved_count(),
            resolved.len()
        );
        resolved
    }

    /// Sets the intended parcel of a building, replacing earlier values
    pub fn insert(&mut self, building: BuildingId, parcel: Option<ParcelId>) {
        self.parcels.insert(building, parcel);
    }

    pub fn intended_parcel(&self, building: BuildingId) -> Option<ParcelId> {
        self.parcels.get(&building).copied().flatten()
    }

    pub fn unresolved_count(&self) -> usize {
        self.parcels.values().filter(|p| p.is_none()).count()
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }
}

impl FromIterator<(BuildingId, Option<ParcelId>)> for BuildingParcels {
    fn from_iter<T: IntoIterator<Item = (BuildingId, Option<ParcelId>)>>(iter: T) -> Self {
        Self::from_intersections(iter)
    }
}

/// Parcel to member segment ids
#[derive(Debug, Clone, Default)]
pub struct ParcelMembers {
    members: HashMap<ParcelId, HashSet<SegmentId>>,
}

impl ParcelMembers {
    pub fn insert(&mut self, parcel: ParcelId, segment: SegmentId) {
        self.members.entry(parcel).or_default().insert(segment);
    }

    pub fn contains(&self, parcel: ParcelId, segment: SegmentId) -> bool {
        self.members
            .get(&parcel)
            .is_some_and(|segments| segments.contains(&segment))
    }

    pub fn segments_of(&self, parcel: ParcelId) -> Option<&HashSet<SegmentId>> {
        self.members.get(&parcel)
    }

    /// Every (parcel, segment) membership, sorted
    pub fn pairs(&self) -> Vec<(ParcelId, SegmentId)> {
        let mut pairs: Vec<_> = self
            .members
            .iter()
            .flat_map(|(&parcel, segments)| segments.iter().map(move |&segment| (parcel, segment)))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Number of parcels with at least one member segment
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromIterator<(ParcelId, SegmentId)> for ParcelMembers {
    fn from_iter<T: IntoIterator<Item = (ParcelId, SegmentId)>>(iter: T) -> Self {
        let mut members = Self::default();
        for (parcel, segment) in iter {
            members.insert(parcel, segment);
        }
        members
    }
}

/// Why a candidate failed the ownership join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Segment id is not in the registry
    UnknownSegment,
    /// Segment has no owning parcel
    OrphanSegment,
    /// Building has no unique intended parcel
    UnresolvedBuilding,
    /// Segment is not part of the building's parcel boundary
    ForeignSegment,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnershipStats {
    pub kept: usize,
    pub unknown_segment: usize,
    pub orphan_segment: usize,
    pub unresolved_building: usize,
    pub foreign_segment: usize,
}

impl OwnershipStats {
    fn record(&mut self, outcome: Result<(), Rejection>) {
        match outcome {
            Ok(()) => self.kept += 1,
            Err(Rejection::UnknownSegment) => self.unknown_segment += 1,
            Err(Rejection::OrphanSegment) => self.orphan_segment += 1,
            Err(Rejection::UnresolvedBuilding) => self.unresolved_building += 1,
            Err(Rejection::ForeignSegment) => self.foreign_segment += 1,
        }
    }

    pub fn rejected(&self) -> usize {
        self.unknown_segment + self.orphan_segment + self.unresolved_building + self.foreign_segment
    }
}

pub struct OwnershipFilter<'a> {
    registry: &'a SegmentRegistry,
    buildings: &'a BuildingParcels,
    members: &'a ParcelMembers,
}

impl<'a> OwnershipFilter<'a> {
    pub fn new(
        registry: &'a SegmentRegistry,
        buildings: &'a BuildingParcels,
        members: &'a ParcelMembers,
    ) -> Self {
        Self {
            registry,
            buildings,
            members,
        }
    }

    /// Decides whether a single candidate belongs to its building's parcel
    pub fn admits(&self, candidate: &Candidate) -> Result<(), Rejection> {
        let segment = self
            .registry
            .get(candidate.segment_id)
            .ok_or(Rejection::UnknownSegment)?;
        if segment.parcel_id.is_none() {
            return Err(Rejection::OrphanSegment);
        }
        let parcel = self
            .buildings
            .intended_parcel(candidate.building_id)
            .ok_or(Rejection::UnresolvedBuilding)?;
        if self.members.contains(parcel, segment.id) {
            Ok(())
        } else {
            Err(Rejection::ForeignSegment)
        }
    }

    /// Candidates that pass the join, in input order
    pub fn apply(&self, candidates: &[Candidate]) -> (Vec<Candidate>, OwnershipStats) {
        let outcomes: Vec<Result<(), Rejection>> =
            candidates.par_iter().map(|c| self.admits(c)).collect();

        let mut stats = OwnershipStats::default();
        let kept = candidates
            .iter()
            .zip(outcomes)
            .filter_map(|(candidate, outcome)| {
                stats.record(outcome);
                outcome.ok().map(|()| *candidate)
            })
            .collect();

        info!(
            "Ownership filter kept {} of {} candidates (unresolved building: {}, foreign segment: {}, \
            orphan segment: {}, unknown segment: {})",
            stats.kept,
            candidates.len(),
            stats.unresolved_building,
            stats.foreign_segment,
            stats.orphan_segment,
            stats.unknown_segment
        );
        (kept, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Segment;

    fn registry() -> SegmentRegistry {
        SegmentRegistry::from_segments(vec![
            Segment::new(1, Some(100), false),
            Segment::new(2, Some(100), true),
            Segment::new(3, Some(200), false),
            Segment::new(4, None, false),
        ])
        .unwrap()
    }

    #[test]
    fn straddling_building_is_unresolved() {
        let buildings =
            BuildingParcels::from_intersections(vec![(1, Some(100)), (1, Some(200)), (2, Some(100)), (2, Some(100))]);
        assert_eq!(buildings.intended_parcel(1), None);
        assert_eq!(buildings.intended_parcel(2), Some(100));
        assert_eq!(buildings.unresolved_count(), 1);
    }

    #[test]
    fn missing_parcel_only_is_unresolved() {
        let buildings = BuildingParcels::from_intersections(vec![(5, None)]);
        assert_eq!(buildings.intended_parcel(5), None);
        assert_eq!(buildings.len(), 1);
    }

    #[test]
    fn join_drops_foreign_and_orphan_segments() {
        let registry = registry();
        let buildings: BuildingParcels = vec![(10, Some(100)), (11, None)].into_iter().collect();
        let members: ParcelMembers = vec![(100, 1), (100, 2), (100, 4), (200, 3)].into_iter().collect();
        let filter = OwnershipFilter::new(&registry, &buildings, &members);

        let candidates = vec![
            Candidate::new(10, 1, 5.0, 1),
            Candidate::new(10, 3, 6.0, 2),
            Candidate::new(10, 4, 7.0, 3),
            Candidate::new(10, 99, 8.0, 4),
            Candidate::new(11, 1, 9.0, 1),
            Candidate::new(10, 2, 10.0, 5),
        ];
        let (kept, stats) = filter.apply(&candidates);

        let kept_ids: Vec<_> = kept.iter().map(|c| c.segment_id).collect();
        assert_eq!(kept_ids, vec![1, 2]);
        assert_eq!(stats.foreign_segment, 1);
        assert_eq!(stats.orphan_segment, 1);
        assert_eq!(stats.unknown_segment, 1);
        assert_eq!(stats.unresolved_building, 1);
        assert_eq!(stats.rejected(), 4);
    }

    #[test]
    fn unknown_building_is_rejected() {
        let registry = registry();
        let buildings = BuildingParcels::new();
        let members: ParcelMembers = vec![(100, 1)].into_iter().collect();
        let filter = OwnershipFilter::new(&registry, &buildings, &members);
        assert_eq!(
            filter.admits(&Candidate::new(42, 1, 1.0, 1)),
            Err(Rejection::UnresolvedBuilding)
        );
    }
}

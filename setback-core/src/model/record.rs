//! Fixed-width per-building output record

use crate::{BuildingId, DEFAULT_SIDE_SLOTS, SegmentId, model::Side};

/// One filled slot: the segment that produced a setback and its distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideSlot {
    pub segment_id: SegmentId,
    pub distance: f64,
}

/// Up to `N` street-facing and `N` interior setbacks of one building
///
/// Filled slots come first and ascend by distance; `None` marks an absent
/// slot. A segment id appears at most once across both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRecord<const N: usize = DEFAULT_SIDE_SLOTS> {
    pub building_id: BuildingId,
    pub facing_street: [Option<SideSlot>; N],
    pub other_side: [Option<SideSlot>; N],
}

impl<const N: usize> AggregatedRecord<N> {
    /// Record with every slot absent
    pub fn empty(building_id: BuildingId) -> Self {
        Self {
            building_id,
            facing_street: [None; N],
            other_side: [None; N],
        }
    }

    pub fn slots(&self, side: Side) -> &[Option<SideSlot>; N] {
        match side {
            Side::FacingStreet => &self.facing_street,
            Side::OtherSide => &self.other_side,
        }
    }

    fn slots_mut(&mut self, side: Side) -> &mut [Option<SideSlot>; N] {
        match side {
            Side::FacingStreet => &mut self.facing_street,
            Side::OtherSide => &mut self.other_side,
        }
    }

    /// Filled slots of one side in order
    pub fn filled(&self, side: Side) -> impl Iterator<Item = &SideSlot> {
        self.slots(side).iter().flatten()
    }

    /// Distances of every filled slot on both sides
    pub fn distances(&self) -> impl Iterator<Item = f64> + '_ {
        Side::ALL
            .into_iter()
            .flat_map(move |side| self.filled(side).map(|slot| slot.distance))
    }

    pub fn filled_count(&self) -> usize {
        self.facing_street.iter().flatten().count() + self.other_side.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0
    }

    pub fn is_full(&self, side: Side) -> bool {
        self.slots(side).iter().all(Option::is_some)
    }

    pub fn contains_segment(&self, segment_id: SegmentId) -> bool {
        Side::ALL
            .into_iter()
            .any(|side| self.filled(side).any(|slot| slot.segment_id == segment_id))
    }

    /// Place a slot in the first free position of `side`
    ///
    /// Returns `false` when the side is already full.
    pub(crate) fn push(&mut self, side: Side, slot: SideSlot) -> bool {
        match self.slots_mut(side).iter_mut().find(|s| s.is_none()) {
            Some(free) => {
                *free = Some(slot);
                true
            }
            None => false,
        }
    }
}

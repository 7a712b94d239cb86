use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BuildingId, SegmentId};

/// Raw row of the near table as produced by the nearest-neighbour search
///
/// Every field but the building id may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct NearRow {
    pub building_id: BuildingId,
    pub segment_id: Option<SegmentId>,
    pub distance: Option<f64>,
    pub rank: Option<u32>,
}

impl NearRow {
    /// Validated candidate, or `None` when the row cannot be used
    pub fn to_candidate(&self) -> Option<Candidate> {
        let segment_id = self.segment_id?;
        let distance = self.distance.filter(|d| d.is_finite() && *d >= 0.0)?;
        Some(Candidate {
            building_id: self.building_id,
            segment_id,
            distance,
            rank: self.rank,
        })
    }
}

/// A building paired with a nearby boundary segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub building_id: BuildingId,
    pub segment_id: SegmentId,
    /// Non-negative, finite distance
    pub distance: f64,
    /// 1-based order among the building's neighbours
    pub rank: Option<u32>,
}

impl Candidate {
    pub fn new(building_id: BuildingId, segment_id: SegmentId, distance: f64, rank: u32) -> Self {
        Self {
            building_id,
            segment_id,
            distance,
            rank: Some(rank),
        }
    }

    /// Deterministic processing order: distance, then segment id, then rank
    pub fn processing_order(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.segment_id.cmp(&other.segment_id))
            .then(
                self.rank
                    .unwrap_or(u32::MAX)
                    .cmp(&other.rank.unwrap_or(u32::MAX)),
            )
    }
}

/// Which kind of boundary a building side faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "facing street")]
    FacingStreet,
    #[serde(rename = "other side")]
    OtherSide,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::FacingStreet, Side::OtherSide];

    pub fn label(self) -> &'static str {
        match self {
            Side::FacingStreet => "facing street",
            Side::OtherSide => "other side",
        }
    }

    /// Column prefix used in output tables
    pub fn column_prefix(self) -> &'static str {
        match self {
            Side::FacingStreet => "FACING_STREET",
            Side::OtherSide => "OTHER_SIDE",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Candidate labelled with the side it faces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedCandidate {
    pub candidate: Candidate,
    pub side: Side,
    /// A parallel named street backs up the classification
    pub street_corroborated: bool,
}

impl ClassifiedCandidate {
    pub fn facing_street(&self) -> bool {
        self.side == Side::FacingStreet
    }
}

//! Parcel boundary segments and bearing helpers

use geo::Line;

use crate::{ParcelId, SegmentId};

/// A single edge of a parcel boundary
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    /// Parcel whose boundary produced this segment
    pub parcel_id: Option<ParcelId>,
    /// Coincides with a neighbouring parcel's boundary
    pub shared_boundary: bool,
    /// Bearing in degrees within `[0, 180)`
    pub bearing: Option<f64>,
    /// Geometry, when the segment was decomposed from a polygon
    pub geometry: Option<Line<f64>>,
    /// Neighbouring parcels whose identical segment was folded into this one
    pub adjacent_parcels: Vec<ParcelId>,
}

impl Segment {
    pub fn new(id: SegmentId, parcel_id: Option<ParcelId>, shared_boundary: bool) -> Self {
        Self {
            id,
            parcel_id,
            shared_boundary,
            bearing: None,
            geometry: None,
            adjacent_parcels: Vec::new(),
        }
    }

    pub(crate) fn from_line(id: SegmentId, parcel_id: ParcelId, line: Line<f64>) -> Self {
        Self {
            id,
            parcel_id: Some(parcel_id),
            shared_boundary: false,
            bearing: Some(line_bearing(&line)),
            geometry: Some(line),
            adjacent_parcels: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = Some(normalize_bearing(bearing));
        self
    }
}

/// Bearing of a line in degrees, direction-agnostic
pub fn line_bearing(line: &Line<f64>) -> f64 {
    normalize_bearing(line.dy().atan2(line.dx()).to_degrees())
}

/// Reduce an angle in degrees to `[0, 180)` so opposite directions compare equal
pub fn normalize_bearing(degrees: f64) -> f64 {
    let reduced = degrees.rem_euclid(180.0);
    // rem_euclid rounds tiny negative inputs up to exactly 180
    if reduced >= 180.0 { 0.0 } else { reduced }
}

/// Smallest angle between two undirected bearings, within `[0, 90]`
pub fn bearing_difference(a: f64, b: f64) -> f64 {
    let diff = (normalize_bearing(a) - normalize_bearing(b)).abs();
    diff.min(180.0 - diff)
}

pub fn is_parallel(a: f64, b: f64, tolerance_deg: f64) -> bool {
    bearing_difference(a, b) <= tolerance_deg
}

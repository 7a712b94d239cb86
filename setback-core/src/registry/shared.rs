//! Detection of boundary segments that two parcels have in common
//!
//! Adjacent parcels decomposed independently each yield a copy of their
//! common lot line. Identical geometry, not mere intersection, marks such a
//! line: crossing but different segments are usually street or alley edges.

use geo::{Coord, Line};
use rstar::{AABB, RTree, RTreeObject};

#[derive(Debug, Clone, Copy)]
struct IndexedLine {
    idx: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedLine {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn padded_envelope(line: &Line<f64>, pad: f64) -> AABB<[f64; 2]> {
    let min_x = line.start.x.min(line.end.x) - pad;
    let min_y = line.start.y.min(line.end.y) - pad;
    let max_x = line.start.x.max(line.end.x) + pad;
    let max_y = line.start.y.max(line.end.y) + pad;
    AABB::from_corners([min_x, min_y], [max_x, max_y])
}

fn coords_match(a: Coord<f64>, b: Coord<f64>, tolerance: f64) -> bool {
    (a.x - b.x).abs() <= tolerance && (a.y - b.y).abs() <= tolerance
}

/// Same endpoints in either orientation; equal length follows
pub(crate) fn same_geometry(a: &Line<f64>, b: &Line<f64>, tolerance: f64) -> bool {
    (coords_match(a.start, b.start, tolerance) && coords_match(a.end, b.end, tolerance))
        || (coords_match(a.start, b.end, tolerance) && coords_match(a.end, b.start, tolerance))
}

/// Groups of indices into `lines` whose geometries are identical
///
/// Only groups of two or more are returned. Each group is sorted and groups
/// are ordered by their first index, so the result does not depend on the
/// R-tree's internal layout.
pub(crate) fn identical_groups(lines: &[Line<f64>], tolerance: f64) -> Vec<Vec<usize>> {
    let tree = RTree::bulk_load(
        lines
            .iter()
            .enumerate()
            .map(|(idx, line)| IndexedLine {
                idx,
                envelope: padded_envelope(line, 0.0),
            })
            .collect(),
    );

    let mut assigned = vec![false; lines.len()];
    let mut groups = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if assigned[idx] {
            continue;
        }
        let mut group: Vec<usize> = tree
            .locate_in_envelope_intersecting(&padded_envelope(line, tolerance))
            .map(|other| other.idx)
            // every segment overlaps itself
            .filter(|&other| other != idx && !assigned[other])
            .filter(|&other| same_geometry(line, &lines[other], tolerance))
            .collect();

        if group.is_empty() {
            continue;
        }
        group.push(idx);
        group.sort_unstable();
        for &member in &group {
            assigned[member] = true;
        }
        groups.push(group);
    }

    groups
}

//! Registry of parcel boundary segments
//!
//! Segments come either from decomposing parcel polygons, in which case the
//! shared-boundary flag is derived from identical geometry, or from a table
//! whose flags were computed upstream. Both paths fail closed: without a
//! usable segment set nothing downstream can be classified.

mod export;
mod shared;

use geo::{Line, MultiPolygon};
use hashbrown::HashMap;
use log::{debug, info};

use crate::{Error, ParcelId, SegmentId, model::Segment, ownership::ParcelMembers};

#[derive(Debug, Clone)]
pub struct SegmentRegistry {
    /// Sorted by segment id
    segments: Vec<Segment>,
    index: HashMap<SegmentId, usize>,
}

impl SegmentRegistry {
    /// Decomposes parcels into segments, flags shared boundaries and keeps a
    /// single representative of every shared boundary
    ///
    /// # Errors
    ///
    /// Returns [`Error::Registry`] if no parcels are given, a parcel id is
    /// repeated, coordinates are not finite or no segment can be produced
    pub fn from_polygons<I>(parcels: I, tolerance: f64) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (ParcelId, MultiPolygon<f64>)>,
    {
        let (segments, groups) = decompose_parcels(parcels, tolerance)?;
        Self::from_segments(fold_duplicates(segments, &groups))
    }

    /// Decomposes parcels into flagged segments without folding duplicates
    ///
    /// Both copies of a shared boundary are returned, each owned by its own
    /// parcel.
    ///
    /// # Errors
    ///
    /// See [`SegmentRegistry::from_polygons`]
    pub fn decompose<I>(parcels: I, tolerance: f64) -> Result<Vec<Segment>, Error>
    where
        I: IntoIterator<Item = (ParcelId, MultiPolygon<f64>)>,
    {
        decompose_parcels(parcels, tolerance).map(|(segments, _)| segments)
    }

    /// Builds the registry from segments with precomputed flags
    ///
    /// # Errors
    ///
    /// Returns [`Error::Registry`] when `segments` is empty or an id repeats
    pub fn from_segments(mut segments: Vec<Segment>) -> Result<Self, Error> {
        if segments.is_empty() {
            return Err(Error::Registry(
                "no boundary segments to establish shared-boundary flags from".to_string(),
            ));
        }
        segments.sort_by_key(|segment| segment.id);
        if let Some(pair) = segments.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(Error::Registry(format!(
                "segment id {} appears more than once",
                pair[0].id
            )));
        }

        let index = segments
            .iter()
            .enumerate()
            .map(|(idx, segment)| (segment.id, idx))
            .collect();

        let registry = Self { segments, index };
        info!(
            "Segment registry holds {} segments, {} on shared boundaries",
            registry.len(),
            registry.shared_count()
        );
        Ok(registry)
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.index.get(&id).map(|&idx| &self.segments[idx])
    }

    pub fn contains(&self, id: SegmentId) -> bool {
        self.index.contains_key(&id)
    }

    /// Segments ordered by id
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn shared_count(&self) -> usize {
        self.segments.iter().filter(|s| s.shared_boundary).count()
    }

    /// Parcel to member segment table: every segment a parcel owns plus every
    /// folded shared boundary it is adjacent to
    pub fn member_segments(&self) -> ParcelMembers {
        let mut members = ParcelMembers::default();
        for segment in &self.segments {
            let Some(owner) = segment.parcel_id else {
                continue;
            };
            members.insert(owner, segment.id);
            for &neighbour in &segment.adjacent_parcels {
                members.insert(neighbour, segment.id);
            }
        }
        members
    }
}

type Decomposition = (Vec<Segment>, Vec<Vec<usize>>);

fn decompose_parcels<I>(parcels: I, tolerance: f64) -> Result<Decomposition, Error>
where
    I: IntoIterator<Item = (ParcelId, MultiPolygon<f64>)>,
{
    let mut parcels: Vec<(ParcelId, MultiPolygon<f64>)> = parcels.into_iter().collect();
    if parcels.is_empty() {
        return Err(Error::Registry("no parcel polygons supplied".to_string()));
    }
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(Error::Registry(format!(
            "invalid coordinate tolerance {tolerance}"
        )));
    }

    // Ids follow parcel id, ring and vertex order
    parcels.sort_by_key(|(parcel_id, _)| *parcel_id);
    if let Some(pair) = parcels.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(Error::Registry(format!(
            "parcel id {} appears more than once",
            pair[0].0
        )));
    }

    let mut segments = Vec::new();
    let mut next_id: SegmentId = 1;
    for (parcel_id, polygons) in &parcels {
        for polygon in polygons {
            let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
            for line in rings.flat_map(|ring| ring.lines()) {
                if !is_finite(&line) {
                    return Err(Error::Registry(format!(
                        "parcel {parcel_id} has non-finite coordinates"
                    )));
                }
                if line.dx().abs() <= tolerance && line.dy().abs() <= tolerance {
                    debug!("Skipping zero-length edge of parcel {parcel_id}");
                    continue;
                }
                segments.push(Segment::from_line(next_id, *parcel_id, line));
                next_id += 1;
            }
        }
    }

    if segments.is_empty() {
        return Err(Error::Registry(
            "parcel polygons produced no boundary segments".to_string(),
        ));
    }

    let lines: Vec<Line<f64>> = segments.iter().filter_map(|s| s.geometry).collect();
    let groups = shared::identical_groups(&lines, tolerance);
    for &idx in groups.iter().flatten() {
        segments[idx].shared_boundary = true;
    }

    info!(
        "Decomposed {} parcels into {} segments, {} shared boundaries found",
        parcels.len(),
        segments.len(),
        groups.len()
    );
    Ok((segments, groups))
}

/// Keeps the lowest-id copy of every shared boundary and records the other
/// copies' owners as its adjacent parcels
fn fold_duplicates(segments: Vec<Segment>, groups: &[Vec<usize>]) -> Vec<Segment> {
    let mut segments = segments;
    let mut removed = vec![false; segments.len()];

    for group in groups {
        let Some((&keep, rest)) = group.split_first() else {
            continue;
        };
        let owners: Vec<ParcelId> = rest.iter().filter_map(|&i| segments[i].parcel_id).collect();
        for &i in rest {
            removed[i] = true;
        }

        let representative = &mut segments[keep];
        let own = representative.parcel_id;
        representative
            .adjacent_parcels
            .extend(owners.into_iter().filter(|&p| Some(p) != own));
        representative.adjacent_parcels.sort_unstable();
        representative.adjacent_parcels.dedup();
    }

    segments
        .into_iter()
        .zip(removed)
        .filter_map(|(segment, removed)| (!removed).then_some(segment))
        .collect()
}

fn is_finite(line: &Line<f64>) -> bool {
    line.start.x.is_finite() && line.start.y.is_finite() && line.end.x.is_finite() && line.end.y.is_finite()
}

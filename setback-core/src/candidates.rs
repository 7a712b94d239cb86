//! Near table produced by the external nearest-neighbour search
//!
//! The table is consumed as-is: ranks may have gaps, rows may lack a
//! segment or a distance, and buildings may be missing entirely. Unusable
//! rows are discarded here while their building stays known, so it can still
//! be reported with an empty record.

use std::collections::BTreeSet;

use log::{debug, info};

use crate::{BuildingId, model::{Candidate, NearRow}};

#[derive(Debug, Clone, Default)]
pub struct CandidateTable {
    candidates: Vec<Candidate>,
    buildings: BTreeSet<BuildingId>,
    discarded: usize,
}

impl CandidateTable {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = NearRow>,
    {
        let mut table = Self::default();
        for row in rows {
            table.buildings.insert(row.building_id);
            match row.to_candidate() {
                Some(candidate) => table.candidates.push(candidate),
                None => {
                    debug!("Discarding incomplete near row {row:?}");
                    table.discarded += 1;
                }
            }
        }
        info!(
            "Loaded {} candidates for {} buildings ({} rows discarded)",
            table.candidates.len(),
            table.buildings.len(),
            table.discarded
        );
        table
    }

    /// Validated candidate rows in input order
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Every building that appears in the table, including those whose
    /// rows were all discarded
    pub fn buildings(&self) -> &BTreeSet<BuildingId> {
        &self.buildings
    }

    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl FromIterator<NearRow> for CandidateTable {
    fn from_iter<T: IntoIterator<Item = NearRow>>(iter: T) -> Self {
        Self::from_rows(iter)
    }
}

impl FromIterator<Candidate> for CandidateTable {
    fn from_iter<T: IntoIterator<Item = Candidate>>(iter: T) -> Self {
        iter.into_iter()
            .map(|c| NearRow {
                building_id: c.building_id,
                segment_id: Some(c.segment_id),
                distance: Some(c.distance),
                rank: c.rank,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_buildings_of_discarded_rows() {
        let rows = vec![
            NearRow {
                building_id: 1,
                segment_id: Some(10),
                distance: Some(4.0),
                rank: Some(1),
            },
            NearRow {
                building_id: 2,
                segment_id: Some(11),
                distance: None,
                rank: Some(1),
            },
        ];
        let table = CandidateTable::from_rows(rows);
        assert_eq!(table.len(), 1);
        assert_eq!(table.discarded(), 1);
        assert_eq!(table.buildings().iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn collects_from_candidates() {
        let table: CandidateTable = vec![Candidate::new(5, 1, 2.5, 1)].into_iter().collect();
        assert_eq!(table.candidates()[0].segment_id, 1);
        assert!(table.buildings().contains(&5));
    }
}

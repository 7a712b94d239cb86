//! Summary statistics of retained setbacks

use serde::Serialize;

use crate::model::{AggregatedRecord, Side};

/// Sum, count and mean of one side type's distances
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStatistic {
    pub side: Side,
    pub sum: f64,
    pub count: usize,
    /// `None` when there is no data to average
    pub mean: Option<f64>,
}

impl SummaryStatistic {
    fn from_distances(side: Side, distances: impl Iterator<Item = f64>) -> Self {
        let (sum, count) = distances.fold((0.0, 0usize), |(sum, count), d| (sum + d, count + 1));
        #[allow(clippy::cast_precision_loss)]
        let mean = (count > 0).then(|| sum / count as f64);
        Self {
            side,
            sum,
            count,
            mean,
        }
    }

    /// Mean formatted for tables, `no data` when empty
    pub fn mean_label(&self) -> String {
        self.mean
            .map_or_else(|| "no data".to_string(), |mean| mean.to_string())
    }
}

/// Statistics over every filled slot, facing street first
pub fn summarize<const N: usize>(records: &[AggregatedRecord<N>]) -> [SummaryStatistic; 2] {
    Side::ALL.map(|side| {
        SummaryStatistic::from_distances(
            side,
            records
                .iter()
                .flat_map(|record| record.filled(side).map(|slot| slot.distance)),
        )
    })
}

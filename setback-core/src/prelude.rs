pub use crate::{DEFAULT_SIDE_SLOTS, SENTINEL};

// Re-export key components
pub use crate::aggregate::aggregate;
pub use crate::candidates::CandidateTable;
pub use crate::classify::{SideClassifier, StreetAdjacency, StreetTable};
pub use crate::config::{SetbackConfig, SidePolicy};
pub use crate::error::{Error, Stage};
pub use crate::model::{AggregatedRecord, Candidate, ClassifiedCandidate, NearRow, Segment, Side, SideSlot};
pub use crate::ownership::{BuildingParcels, OwnershipFilter, ParcelMembers};
pub use crate::pipeline::{PipelineInputs, RunCounts, SetbackReport, measure_setbacks};
pub use crate::quality::{QualityReport, quality_filter};
pub use crate::registry::SegmentRegistry;
pub use crate::report::{SummaryStatistic, summarize};

// Identifier types
pub use crate::BuildingId;
pub use crate::ParcelId;
pub use crate::SegmentId;

//! Data model shared by all pipeline stages

pub mod candidate;
pub mod record;
pub mod segment;

pub use candidate::{Candidate, ClassifiedCandidate, NearRow, Side};
pub use record::{AggregatedRecord, SideSlot};
pub use segment::{Segment, bearing_difference, is_parallel, line_bearing, normalize_bearing};

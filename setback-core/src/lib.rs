//! Setback measurement core
//!
//! Classifies building-to-parcel-boundary distances as street facing or
//! interior and collapses them into fixed-width per-building records.

pub mod aggregate;
pub mod candidates;
pub mod classify;
pub mod config;
pub mod error;
pub mod loading;
pub mod model;
pub mod ownership;
pub mod pipeline;
pub mod prelude;
pub mod quality;
pub mod registry;
pub mod report;

pub use config::{SetbackConfig, SidePolicy};
pub use error::{Error, Stage};
pub use model::{AggregatedRecord, Candidate, ClassifiedCandidate, NearRow, Segment, Side, SideSlot};
pub use pipeline::{PipelineInputs, RunCounts, SetbackReport, measure_setbacks};
pub use registry::SegmentRegistry;
pub use report::SummaryStatistic;

/// Identifier of a parcel boundary segment
pub type SegmentId = i64;
/// Identifier of a parcel polygon
pub type ParcelId = i64;
/// Identifier of a building footprint
pub type BuildingId = i64;

/// Number of slots per side in an aggregated record unless chosen otherwise
pub const DEFAULT_SIDE_SLOTS: usize = 4;

/// Value written in place of absent slots in output tables
pub const SENTINEL: i64 = -1;

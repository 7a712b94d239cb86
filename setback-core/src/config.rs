//! Run configuration passed explicitly into the pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Error;

/// How the side classifier treats street adjacency evidence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidePolicy {
    /// Non-shared segments face the street; street parallelism is only
    /// recorded as corroboration.
    #[default]
    SharedBoundary,
    /// Non-shared segments face the street only when a parallel named
    /// street backs them up. Shared segments stay interior either way.
    StreetCorroborated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetbackConfig {
    /// Records with more filled slots than this are dropped
    pub max_sides: usize,
    /// Coordinate tolerance used when matching identical boundary segments
    pub coordinate_tolerance: f64,
    /// Angular tolerance in degrees for street parallelism
    pub parallel_tolerance_deg: f64,
    pub side_policy: SidePolicy,
    /// Drop buildings left without any candidate instead of reporting
    /// an all-sentinel record
    pub drop_empty_records: bool,
    /// Candidates farther than this are ignored
    pub max_distance: Option<f64>,
    /// Radius of the upstream near search, kept as run metadata
    pub search_radius: f64,
    /// Candidate count of the upstream near search, kept as run metadata
    pub max_candidates: usize,
    /// Imagery date of the building footprints
    pub source_date: Option<NaiveDate>,
}

impl Default for SetbackConfig {
    fn default() -> Self {
        Self {
            max_sides: 4,
            coordinate_tolerance: 1e-6,
            parallel_tolerance_deg: 10.0,
            side_policy: SidePolicy::default(),
            drop_empty_records: false,
            max_distance: None,
            search_radius: 300.0,
            max_candidates: 30,
            source_date: None,
        }
    }
}

impl SetbackConfig {
    /// Checks that every parameter is usable
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending parameter
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_sides == 0 {
            return Err(Error::InvalidConfig(
                "max_sides must be at least 1".to_string(),
            ));
        }
        if !self.coordinate_tolerance.is_finite() || self.coordinate_tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "coordinate_tolerance must be a non-negative number, got {}",
                self.coordinate_tolerance
            )));
        }
        if !(0.0..=90.0).contains(&self.parallel_tolerance_deg) {
            return Err(Error::InvalidConfig(format!(
                "parallel_tolerance_deg must be within 0..=90, got {}",
                self.parallel_tolerance_deg
            )));
        }
        if let Some(max_distance) = self.max_distance
            && (!max_distance.is_finite() || max_distance <= 0.0)
        {
            return Err(Error::InvalidConfig(format!(
                "max_distance must be a positive number, got {max_distance}"
            )));
        }
        if !self.search_radius.is_finite() || self.search_radius <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "search_radius must be a positive number, got {}",
                self.search_radius
            )));
        }
        Ok(())
    }
}

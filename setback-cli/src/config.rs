//! TOML run configuration
//!
//! ```toml
//! [inputs]
//! segments = "segments.csv"
//! buildings = "buildings.csv"
//! candidates = "near.csv"
//!
//! [outputs]
//! records = "setbacks.csv"
//! summary = "summary.csv"
//!
//! [setback]
//! max_sides = 4
//! source_date = "2023-05-01"
//! ```
//!
//! Relative paths are resolved against the directory of the config file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use setback_core::SetbackConfig;

use crate::RunArgs;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputPaths {
    pub segments: Option<PathBuf>,
    pub parcels: Option<PathBuf>,
    pub buildings: Option<PathBuf>,
    pub members: Option<PathBuf>,
    pub candidates: Option<PathBuf>,
    pub streets: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputPaths {
    pub records: PathBuf,
    pub summary: PathBuf,
    pub summary_json: Option<PathBuf>,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            records: PathBuf::from("setbacks.csv"),
            summary: PathBuf::from("summary.csv"),
            summary_json: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub inputs: InputPaths,
    pub outputs: OutputPaths,
    pub setback: SetbackConfig,
}

/// Where the registry comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    Segments(PathBuf),
    Parcels(PathBuf),
}

impl CliConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?;
        let mut config: CliConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config '{}'", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_relative(base);
        }
        Ok(config)
    }

    /// Loads the config file if given, then applies command line overrides
    pub fn load(args: &RunArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(args);
        Ok(config)
    }

    fn resolve_relative(&mut self, base: &Path) {
        let inputs = &mut self.inputs;
        for path in [
            &mut inputs.segments,
            &mut inputs.parcels,
            &mut inputs.buildings,
            &mut inputs.members,
            &mut inputs.candidates,
            &mut inputs.streets,
            &mut self.outputs.summary_json,
        ]
        .into_iter()
        .flatten()
        {
            *path = rebase(base, path);
        }
        self.outputs.records = rebase(base, &self.outputs.records);
        self.outputs.summary = rebase(base, &self.outputs.summary);
    }

    fn apply(&mut self, args: &RunArgs) {
        // A registry source on the command line replaces either source in the file
        if args.segments.is_some() || args.parcels.is_some() {
            self.inputs.segments = args.segments.clone();
            self.inputs.parcels = args.parcels.clone();
        }
        override_with(&mut self.inputs.buildings, &args.buildings);
        override_with(&mut self.inputs.members, &args.members);
        override_with(&mut self.inputs.candidates, &args.candidates);
        override_with(&mut self.inputs.streets, &args.streets);
        override_with(&mut self.outputs.summary_json, &args.summary_json);
        if let Some(records) = &args.records {
            self.outputs.records.clone_from(records);
        }
        if let Some(summary) = &args.summary {
            self.outputs.summary.clone_from(summary);
        }
        if let Some(max_sides) = args.max_sides {
            self.setback.max_sides = max_sides;
        }
    }

    pub fn registry_source(&self) -> Result<RegistrySource> {
        match (&self.inputs.segments, &self.inputs.parcels) {
            (Some(segments), None) => Ok(RegistrySource::Segments(segments.clone())),
            (None, Some(parcels)) => Ok(RegistrySource::Parcels(parcels.clone())),
            (Some(_), Some(_)) => bail!("Give either a segment table or a parcel table, not both"),
            (None, None) => bail!("A segment table or a parcel table is required"),
        }
    }

    pub fn buildings(&self) -> Result<&Path> {
        required(&self.inputs.buildings, "buildings")
    }

    pub fn candidates(&self) -> Result<&Path> {
        required(&self.inputs.candidates, "candidates")
    }
}

fn rebase(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn override_with(target: &mut Option<PathBuf>, value: &Option<PathBuf>) {
    if value.is_some() {
        target.clone_from(value);
    }
}

fn required<'a>(path: &'a Option<PathBuf>, name: &str) -> Result<&'a Path> {
    path.as_deref()
        .with_context(|| format!("Missing input table '{name}'"))
}

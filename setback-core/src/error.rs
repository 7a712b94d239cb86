use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Segment registry error: {0}")]
    Registry(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Geometry error: {0}")]
    GeometryError(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the pipeline stage that produced this error
    pub fn at(self, stage: Stage) -> Self {
        match self {
            Error::Stage { .. } => self,
            other => Error::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }
}

/// Pipeline stages, used to name the failing step in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    Registry,
    Candidates,
    Ownership,
    Classification,
    Aggregation,
    Quality,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::Registry => "segment registry",
            Stage::Candidates => "candidate table",
            Stage::Ownership => "ownership filter",
            Stage::Classification => "side classifier",
            Stage::Aggregation => "aggregation",
            Stage::Quality => "quality filter",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

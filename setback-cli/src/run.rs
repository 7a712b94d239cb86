use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use setback_core::{
    DEFAULT_SIDE_SLOTS, PipelineInputs, RunCounts, SegmentRegistry, SetbackConfig, SetbackReport,
    SummaryStatistic,
    candidates::CandidateTable,
    loading::{
        BuildingParcelRow, MemberRow, SegmentRow, StreetRow, building_parcels_from_rows,
        members_from_rows, read_registry_table, read_table, registry_from_rows,
        street_table_from_rows, write_records, write_summary,
    },
    measure_setbacks,
    model::NearRow,
};
use tracing::info;

use crate::{
    RunArgs,
    config::{CliConfig, RegistrySource},
    registry::build_registry,
};

/// Summary document written next to the output tables
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    source_date: Option<NaiveDate>,
    config: &'a SetbackConfig,
    counts: RunCounts,
    summary: &'a [SummaryStatistic],
}

fn read<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<T>> {
    let rows: Vec<T> =
        read_table(path).with_context(|| format!("Failed to read {what} from '{}'", path.display()))?;
    info!("Read {} {what} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn load_registry(config: &CliConfig) -> Result<SegmentRegistry> {
    match config.registry_source()? {
        RegistrySource::Segments(path) => {
            let rows: Vec<SegmentRow> = read_registry_table(&path)
                .with_context(|| format!("Failed to read segments from '{}'", path.display()))?;
            info!("Read {} segment rows from {}", rows.len(), path.display());
            registry_from_rows(rows)
                .with_context(|| format!("Failed to build segment registry from '{}'", path.display()))
        }
        RegistrySource::Parcels(path) => build_registry(&path, config.setback.coordinate_tolerance),
    }
}

pub fn execute(config: &CliConfig) -> Result<SetbackReport<DEFAULT_SIDE_SLOTS>> {
    let registry = load_registry(config)?;

    let building_rows: Vec<BuildingParcelRow> = read(config.buildings()?, "building")?;
    let buildings = building_parcels_from_rows(&building_rows);

    let near_rows: Vec<NearRow> = read(config.candidates()?, "candidate")?;
    let candidates = CandidateTable::from_rows(near_rows);

    let members = match &config.inputs.members {
        Some(path) => Some(members_from_rows(&read::<MemberRow>(path, "member")?)),
        None => None,
    };
    let streets = match &config.inputs.streets {
        Some(path) => Some(street_table_from_rows(read::<StreetRow>(path, "street")?)),
        None => None,
    };

    let mut inputs = PipelineInputs::new(&registry, &buildings, &candidates);
    if let Some(members) = &members {
        inputs = inputs.with_members(members);
    }
    if let Some(streets) = &streets {
        inputs = inputs.with_streets(streets);
    }

    let report = measure_setbacks(&inputs, &config.setback)?;
    Ok(report)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create '{}'", path.display()))?;
    Ok(BufWriter::new(file))
}

pub fn write_outputs(config: &CliConfig, report: &SetbackReport<DEFAULT_SIDE_SLOTS>) -> Result<()> {
    let outputs = &config.outputs;
    write_records(create(&outputs.records)?, &report.records)
        .with_context(|| format!("Failed to write records to '{}'", outputs.records.display()))?;
    write_summary(create(&outputs.summary)?, &report.summary)
        .with_context(|| format!("Failed to write summary to '{}'", outputs.summary.display()))?;

    if let Some(path) = &outputs.summary_json {
        let document = RunSummary {
            source_date: config.setback.source_date,
            config: &config.setback,
            counts: report.counts,
            summary: &report.summary,
        };
        fs::write(path, serde_json::to_string_pretty(&document)?)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
    }
    info!(
        "Wrote {} records to {}",
        report.records.len(),
        outputs.records.display()
    );
    Ok(())
}

pub fn cmd_run(args: &RunArgs) -> Result<()> {
    let config = CliConfig::load(args)?;
    let report = execute(&config)?;
    write_outputs(&config, &report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn runs_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "segments.csv",
            "segment_id,parcel_id,shared_boundary,bearing\n1,100,0,\n2,100,0,\n3,100,1,\n4,200,0,\n",
        );
        write(dir.path(), "buildings.csv", "building_id,parcel_id\n10,100\n11,100\n11,200\n");
        write(
            dir.path(),
            "near.csv",
            "building_id,segment_id,distance,rank\n10,1,12.0,1\n10,1,12.3,2\n10,3,4.0,3\n10,4,2.0,4\n11,4,3.0,1\n",
        );
        let config_path = write(
            dir.path(),
            "setback.toml",
            "[inputs]\nsegments = \"segments.csv\"\nbuildings = \"buildings.csv\"\ncandidates = \"near.csv\"\n\
             [outputs]\nsummary_json = \"summary.json\"\n\
             [setback]\nsource_date = \"2023-05-01\"\n",
        );

        let args = RunArgs {
            config: Some(config_path),
            ..RunArgs::default()
        };
        cmd_run(&args).unwrap();

        let records = fs::read_to_string(dir.path().join("setbacks.csv")).unwrap();
        let lines: Vec<&str> = records.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("BUILDING_ID,FACING_STREET_1_SEGMENT_ID,FACING_STREET_1_DIST"));
        assert_eq!(lines[1], "10,1,12,-1,-1,-1,-1,-1,-1,3,4,-1,-1,-1,-1,-1,-1");
        assert_eq!(lines[2], "11,-1,-1,-1,-1,-1,-1,-1,-1,-1,-1,-1,-1,-1,-1,-1,-1");

        let summary = fs::read_to_string(dir.path().join("summary.csv")).unwrap();
        assert!(summary.contains("facing street,12,1,12"));

        let document: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(document["source_date"], "2023-05-01");
        assert_eq!(document["counts"]["retained"], 2);
    }

    #[test]
    fn malformed_segment_row_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let segments = write(
            dir.path(),
            "segments.csv",
            "segment_id,parcel_id,shared_boundary,bearing\n1,5,0,\n2,5,maybe,\n",
        );
        let buildings = write(dir.path(), "buildings.csv", "building_id,parcel_id\n10,5\n");
        let candidates = write(
            dir.path(),
            "near.csv",
            "building_id,segment_id,distance,rank\n10,2,4.0,1\n",
        );
        let args = RunArgs {
            segments: Some(segments),
            buildings: Some(buildings),
            candidates: Some(candidates),
            ..RunArgs::default()
        };
        let config = CliConfig::load(&args).unwrap();
        let err = execute(&config).unwrap_err();
        assert!(format!("{err:#}").contains("line 3"), "{err:#}");
    }

    #[test]
    fn missing_candidates_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let segments = write(
            dir.path(),
            "segments.csv",
            "segment_id,parcel_id,shared_boundary,bearing\n1,100,0,\n",
        );
        let buildings = write(dir.path(), "buildings.csv", "building_id,parcel_id\n10,100\n");
        let args = RunArgs {
            segments: Some(segments),
            buildings: Some(buildings),
            ..RunArgs::default()
        };
        let config = CliConfig::load(&args).unwrap();
        let err = execute(&config).unwrap_err();
        assert!(err.to_string().contains("'candidates'"));
    }
}

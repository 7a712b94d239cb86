use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use setback_core::{SegmentRegistry, loading::write_segments};
use tracing::info;

use crate::parcels::read_parcels;

pub fn build_registry(parcels: &Path, tolerance: f64) -> Result<SegmentRegistry> {
    let polygons = read_parcels(parcels)?;
    info!("Decomposing {} parcels", polygons.len());
    let registry = SegmentRegistry::from_polygons(polygons, tolerance)
        .with_context(|| format!("Failed to build segment registry from '{}'", parcels.display()))?;
    info!(
        "Registry holds {} segments, {} shared",
        registry.len(),
        registry.shared_count()
    );
    Ok(registry)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create '{}'", path.display()))?;
    Ok(BufWriter::new(file))
}

pub fn cmd_registry(
    parcels: &Path,
    out: &Path,
    members_out: Option<&Path>,
    geojson: Option<&Path>,
    tolerance: f64,
) -> Result<()> {
    let registry = build_registry(parcels, tolerance)?;

    let members = members_out.map(create).transpose()?;
    write_segments(create(out)?, &registry, members)
        .with_context(|| format!("Failed to write segments to '{}'", out.display()))?;
    info!("Wrote segment table to {}", out.display());

    if let Some(path) = geojson {
        fs::write(path, registry.to_geojson_string()?)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        info!("Wrote GeoJSON to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use setback_core::loading::{MemberRow, SegmentRow, read_table};

    const TWO_LOTS: &str = "parcel_id,wkt\n\
        1,\"POLYGON((0 0,50 0,50 50,0 50,0 0))\"\n\
        2,\"POLYGON((50 0,100 0,100 50,50 50,50 0))\"\n";

    #[test]
    fn truncated_neighbour_aborts_the_registry() {
        let dir = tempfile::tempdir().unwrap();
        let parcels = dir.path().join("parcels.csv");
        fs::write(
            &parcels,
            "parcel_id,wkt\n\
             1,\"POLYGON((0 0,50 0,50 50,0 50,0 0))\"\n\
             2,\"POLYGON((50 0,100 0,100 50\"\n",
        )
        .unwrap();

        let err = build_registry(&parcels, 1e-6).unwrap_err();
        assert!(format!("{err:#}").contains("Parcel 2"), "{err:#}");
    }

    #[test]
    fn writes_segment_and_member_tables() {
        let dir = tempfile::tempdir().unwrap();
        let parcels = dir.path().join("parcels.csv");
        let out = dir.path().join("segments.csv");
        let members = dir.path().join("members.csv");
        let geojson = dir.path().join("segments.geojson");
        fs::write(&parcels, TWO_LOTS).unwrap();

        cmd_registry(&parcels, &out, Some(&members), Some(&geojson), 1e-6).unwrap();

        let segments: Vec<SegmentRow> = read_table(&out).unwrap();
        assert_eq!(segments.len(), 7);
        assert_eq!(segments.iter().filter(|s| s.shared_boundary).count(), 1);

        let members: Vec<MemberRow> = read_table(&members).unwrap();
        assert_eq!(members.len(), 8);

        let text = fs::read_to_string(&geojson).unwrap();
        assert!(text.contains("\"FeatureCollection\""));
    }
}

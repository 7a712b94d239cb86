use std::path::Path;

use anyhow::{Context, Result, anyhow};
use geo::{Geometry, MultiPolygon};
use setback_core::{
    ParcelId,
    loading::{ParcelRow, read_registry_table},
};
use wkt::TryFromWkt;

/// Parses a POLYGON or MULTIPOLYGON
pub fn parse_parcel(wkt: &str) -> Result<MultiPolygon<f64>> {
    let geometry = Geometry::<f64>::try_from_wkt_str(wkt).map_err(|e| anyhow!("invalid WKT: {e}"))?;
    match geometry {
        Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon])),
        Geometry::MultiPolygon(multi) => Ok(multi),
        _ => Err(anyhow!("expected a POLYGON or MULTIPOLYGON")),
    }
}

/// Reads the parcel table
///
/// A missing parcel would leave its neighbours' lot lines unpaired, so any
/// unreadable row or geometry fails the whole table.
pub fn read_parcels(path: &Path) -> Result<Vec<(ParcelId, MultiPolygon<f64>)>> {
    let rows: Vec<ParcelRow> = read_registry_table(path)
        .with_context(|| format!("Failed to read parcels from '{}'", path.display()))?;

    rows.into_iter()
        .map(|row| -> Result<(ParcelId, MultiPolygon<f64>)> {
            let geometry = parse_parcel(&row.wkt)
                .with_context(|| format!("Parcel {} has unusable geometry", row.parcel_id))?;
            Ok((row.parcel_id, geometry))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_polygons_and_multipolygons() {
        let single = parse_parcel("POLYGON((0 0,10 0,10 10,0 10,0 0))").unwrap();
        assert_eq!(single.0.len(), 1);
        let multi =
            parse_parcel("MULTIPOLYGON(((0 0,1 0,1 1,0 0)),((5 5,6 5,6 6,5 5)))").unwrap();
        assert_eq!(multi.0.len(), 2);
    }

    #[test]
    fn rejects_other_geometries() {
        assert!(parse_parcel("LINESTRING(0 0,1 1)").is_err());
        assert!(parse_parcel("POLYGON((0 0,").is_err());
    }

    #[test]
    fn unparseable_parcel_fails_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parcels.csv");
        std::fs::write(
            &path,
            "parcel_id,wkt\n1,\"POLYGON((0 0,10 0,10 10,0 10,0 0))\"\n2,\"POINT(1 1)\"\n",
        )
        .unwrap();
        let err = read_parcels(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Parcel 2"), "{err:#}");
    }
}

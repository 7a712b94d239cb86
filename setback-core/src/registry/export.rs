use geo::LineString;
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use super::SegmentRegistry;
use crate::{Error, model::Segment};

impl SegmentRegistry {
    /// Converts geometry-backed segments to a `GeoJSON` `FeatureCollection`
    ///
    /// Segments loaded from a table without geometry are skipped.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let features = self
            .iter()
            .filter(|segment| segment.geometry.is_some())
            .map(segment_feature)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn segment_feature(segment: &Segment) -> Result<Feature, Error> {
    let geometry = segment
        .geometry
        .map(|line| Geometry::new(GeoJsonValue::from(&LineString::new(vec![line.start, line.end]))));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "segment_id": segment.id,
            "parcel_id": segment.parcel_id,
            "shared_boundary": segment.shared_boundary,
            "bearing": segment.bearing,
            "adjacent_parcels": segment.adjacent_parcels,
        }
    });

    Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

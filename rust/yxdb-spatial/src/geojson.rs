use yxdb_common::{Result, error::Error};

use crate::decoder::decode;

/// Converts the raw value of a `SpatialObj` field into GeoJSON text.
///
/// A null field yields `None`; anything else must decode as a spatial object.
pub fn to_geojson(blob: Option<&[u8]>) -> Result<Option<String>> {
    let Some(blob) = blob else {
        return Ok(None);
    };
    let geometry = decode(blob)?;
    serde_json::to_string(&geometry)
        .map(Some)
        .map_err(|e| Error::malformed_spatial(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use yxdb_common::error::ErrorKind;

    #[test]
    fn test_null_short_circuits() {
        assert_eq!(to_geojson(None).unwrap(), None);
    }

    #[test]
    fn test_point_geojson() {
        let mut blob = vec![0u8; 40];
        blob[..4].copy_from_slice(&8u32.to_le_bytes());
        blob[36..40].copy_from_slice(&1u32.to_le_bytes());
        blob.extend_from_slice(&(-96.679688f64).to_le_bytes());
        blob.extend_from_slice(&37.230328f64.to_le_bytes());
        assert_eq!(
            to_geojson(Some(&blob[..])).unwrap().as_deref(),
            Some(r#"{"type":"Point","coordinates":[-96.679688,37.230328]}"#)
        );
    }

    #[test]
    fn test_empty_blob_is_not_spatial() {
        let err = to_geojson(Some(&[][..])).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedSpatial { .. }));
    }
}

//! Binary layout of spatial blobs.
//!
//! ```text
//! [0..4)     object type tag (u32)
//! [36..40)   points: point count (u32)
//!            lines/polygons: part count (u32)
//! [40..)     points: (lng, lat) f64 pairs
//! [40..48)   lines/polygons: total point count (u64)
//! [48..)     lines/polygons: part count - 1 ending point indices (u32),
//!            then the (lng, lat) f64 pairs of all parts
//! ```

use byteorder::{ByteOrder, LittleEndian};
use yxdb_common::{Result, error::Error};

use crate::geometry::{Coordinate, Geometry};

pub const POINTS_TAG: u32 = 8;
pub const LINES_TAG: u32 = 3;
pub const POLYGONS_TAG: u32 = 5;

/// Blobs shorter than this cannot hold a spatial object.
pub const MIN_BLOB_LEN: usize = 20;

const COUNT_OFFSET: usize = 36;
const POINTS_OFFSET: usize = 40;
const TOTAL_POINTS_OFFSET: usize = 40;
const PART_INDEX_OFFSET: usize = 48;
const BYTES_PER_POINT: usize = 16;

/// Decodes a spatial blob into a geometry.
///
/// A null blob must be handled by the caller before reaching this function;
/// see [`to_geojson`](crate::to_geojson).
///
/// # Errors
///
/// - `MalformedSpatial` if the blob is shorter than 20 bytes or any count or
///   index points outside the blob.
/// - `UnsupportedGeometryType` for a type tag other than points, lines or
///   polygons.
pub fn decode(blob: &[u8]) -> Result<Geometry> {
    if blob.len() < MIN_BLOB_LEN {
        return Err(Error::malformed_spatial(format!(
            "{} bytes is shorter than the minimum of {MIN_BLOB_LEN}",
            blob.len()
        )));
    }
    match LittleEndian::read_u32(&blob[..4]) {
        POINTS_TAG => decode_points(blob),
        LINES_TAG => {
            let mut parts = decode_parts(blob)?;
            if parts.len() == 1 {
                Ok(Geometry::LineString(parts.remove(0)))
            } else {
                Ok(Geometry::MultiLineString(parts))
            }
        }
        POLYGONS_TAG => {
            let rings = decode_parts(blob)?;
            if rings.len() == 1 {
                Ok(Geometry::Polygon(rings))
            } else {
                Ok(Geometry::MultiPolygon(vec![rings]))
            }
        }
        tag => Err(Error::unsupported_geometry_type(tag)),
    }
}

fn decode_points(blob: &[u8]) -> Result<Geometry> {
    if read_u32(blob, COUNT_OFFSET)? == 1 {
        return Ok(Geometry::Point(read_coordinate(blob, POINTS_OFFSET)?));
    }
    let mut points = Vec::new();
    let mut at = POINTS_OFFSET;
    while at < blob.len() {
        points.push(read_coordinate(blob, at)?);
        at += BYTES_PER_POINT;
    }
    Ok(Geometry::MultiPoint(points))
}

/// Splits the point stream of a line or polygon blob into its parts.
fn decode_parts(blob: &[u8]) -> Result<Vec<Vec<Coordinate>>> {
    let total_parts = read_u32(blob, COUNT_OFFSET)? as usize;
    if total_parts == 0 {
        return Err(Error::malformed_spatial("object has no parts"));
    }
    let total_points = read_u64(blob, TOTAL_POINTS_OFFSET)?;

    let index_table_len = (total_parts - 1)
        .checked_mul(4)
        .ok_or_else(|| Error::malformed_spatial("part count overflows"))?;
    let points_start = PART_INDEX_OFFSET + index_table_len;
    let ending_offset = |point_index: u64| -> Result<usize> {
        usize::try_from(point_index)
            .ok()
            .and_then(|i| i.checked_mul(BYTES_PER_POINT))
            .and_then(|len| len.checked_add(points_start))
            .ok_or_else(|| Error::malformed_spatial(format!("point index {point_index} overflows")))
    };

    let mut parts = Vec::new();
    let mut at = points_start;
    for part in 0..total_parts {
        let end = if part + 1 < total_parts {
            ending_offset(read_u32(blob, PART_INDEX_OFFSET + part * 4)? as u64)?
        } else {
            ending_offset(total_points)?
        };
        let mut coords = Vec::new();
        while at < end {
            coords.push(read_coordinate(blob, at)?);
            at += BYTES_PER_POINT;
        }
        parts.push(coords);
    }
    Ok(parts)
}

fn read_coordinate(blob: &[u8], at: usize) -> Result<Coordinate> {
    let bytes = slice_at(blob, at, BYTES_PER_POINT)?;
    Ok([
        LittleEndian::read_f64(&bytes[..8]),
        LittleEndian::read_f64(&bytes[8..]),
    ])
}

fn read_u32(blob: &[u8], at: usize) -> Result<u32> {
    slice_at(blob, at, 4).map(LittleEndian::read_u32)
}

fn read_u64(blob: &[u8], at: usize) -> Result<u64> {
    slice_at(blob, at, 8).map(LittleEndian::read_u64)
}

fn slice_at(blob: &[u8], at: usize, len: usize) -> Result<&[u8]> {
    at.checked_add(len)
        .and_then(|end| blob.get(at..end))
        .ok_or_else(|| {
            Error::malformed_spatial(format!(
                "{len} bytes at offset {at} exceed the blob length {}",
                blob.len()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use yxdb_common::error::ErrorKind;

    fn points_blob(points: &[Coordinate]) -> Vec<u8> {
        let mut blob = vec![0u8; POINTS_OFFSET];
        blob[..4].copy_from_slice(&POINTS_TAG.to_le_bytes());
        blob[COUNT_OFFSET..COUNT_OFFSET + 4].copy_from_slice(&(points.len() as u32).to_le_bytes());
        for [lng, lat] in points {
            blob.extend_from_slice(&lng.to_le_bytes());
            blob.extend_from_slice(&lat.to_le_bytes());
        }
        blob
    }

    fn parts_blob(tag: u32, parts: &[Vec<Coordinate>]) -> Vec<u8> {
        let total_points: usize = parts.iter().map(Vec::len).sum();
        let mut blob = vec![0u8; PART_INDEX_OFFSET];
        blob[..4].copy_from_slice(&tag.to_le_bytes());
        blob[COUNT_OFFSET..COUNT_OFFSET + 4].copy_from_slice(&(parts.len() as u32).to_le_bytes());
        blob[TOTAL_POINTS_OFFSET..TOTAL_POINTS_OFFSET + 8]
            .copy_from_slice(&(total_points as u64).to_le_bytes());
        let mut end = 0u32;
        for part in &parts[..parts.len() - 1] {
            end += part.len() as u32;
            blob.extend_from_slice(&end.to_le_bytes());
        }
        for [lng, lat] in parts.iter().flatten() {
            blob.extend_from_slice(&lng.to_le_bytes());
            blob.extend_from_slice(&lat.to_le_bytes());
        }
        blob
    }

    #[test]
    fn test_single_point() {
        let blob = points_blob(&[[-96.679688, 37.230328]]);
        assert_eq!(
            decode(&blob).unwrap(),
            Geometry::Point([-96.679688, 37.230328])
        );
    }

    #[test]
    fn test_multi_point() {
        let points = [
            [-113.730469, 7.885147],
            [-113.378906, 46.679594],
            [-100.019531, 40.178873],
            [-88.769531, 49.61071],
            [-85.957031, 12.039321],
        ];
        let blob = points_blob(&points);
        assert_eq!(
            decode(&blob).unwrap(),
            Geometry::MultiPoint(points.to_vec())
        );
    }

    #[test]
    fn test_line_string() {
        let line = vec![[-106.875, 42.293564], [-84.375, 41.244772]];
        let blob = parts_blob(LINES_TAG, &[line.clone()]);
        assert_eq!(decode(&blob).unwrap(), Geometry::LineString(line));
    }

    #[test]
    fn test_multi_line_string() {
        let parts = vec![
            vec![[-92.285156, 55.875311], [-74.355469, 53.225768]],
            vec![[-121.464844, 45.213004], [-109.6875, -0.175781], [1.0, 2.0]],
            vec![[-114.082031, 57.231503], [-107.753906, 55.677584]],
        ];
        let blob = parts_blob(LINES_TAG, &parts);
        assert_eq!(decode(&blob).unwrap(), Geometry::MultiLineString(parts));
    }

    #[test]
    fn test_polygon_nesting() {
        let ring = vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 0.0]];
        let hole = vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 1.0]];

        let blob = parts_blob(POLYGONS_TAG, &[ring.clone()]);
        assert_eq!(
            decode(&blob).unwrap(),
            Geometry::Polygon(vec![ring.clone()])
        );

        let blob = parts_blob(POLYGONS_TAG, &[ring.clone(), hole.clone()]);
        assert_eq!(
            decode(&blob).unwrap(),
            Geometry::MultiPolygon(vec![vec![ring, hole]])
        );
    }

    #[test]
    fn test_short_blob() {
        let err = decode(&[8, 0, 0, 0]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedSpatial { .. }));
    }

    #[test]
    fn test_unsupported_tag() {
        let mut blob = points_blob(&[[1.0, 2.0]]);
        blob[0] = 1;
        let err = decode(&blob).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnsupportedGeometryType { tag: 1 }
        ));
    }

    #[test]
    fn test_point_count_past_end_of_blob() {
        let line = vec![[1.0, 2.0], [3.0, 4.0]];
        let mut blob = parts_blob(LINES_TAG, &[line]);
        blob[TOTAL_POINTS_OFFSET..TOTAL_POINTS_OFFSET + 8].copy_from_slice(&1000u64.to_le_bytes());
        let err = decode(&blob).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedSpatial { .. }));
    }

    #[test]
    fn test_zero_parts() {
        let mut blob = parts_blob(LINES_TAG, &[vec![[1.0, 2.0]]]);
        blob[COUNT_OFFSET..COUNT_OFFSET + 4].copy_from_slice(&0u32.to_le_bytes());
        let err = decode(&blob).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedSpatial { .. }));
    }

    #[test]
    fn test_partial_trailing_point() {
        let mut blob = points_blob(&[[1.0, 2.0], [3.0, 4.0]]);
        blob.truncate(blob.len() - 3);
        let err = decode(&blob).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedSpatial { .. }));
    }
}

//! `SpatialObj` blob construction.

const POINTS_TAG: u32 = 8;
pub const LINES_TAG: u32 = 3;
pub const POLYGONS_TAG: u32 = 5;

/// A single point.
pub fn point_blob(lng: f64, lat: f64) -> Vec<u8> {
    points_blob(&[[lng, lat]])
}

/// A point collection; a single coordinate produces a point object.
pub fn points_blob(points: &[[f64; 2]]) -> Vec<u8> {
    let mut blob = vec![0u8; 40];
    blob[..4].copy_from_slice(&POINTS_TAG.to_le_bytes());
    blob[36..40].copy_from_slice(&(points.len() as u32).to_le_bytes());
    push_coordinates(&mut blob, points.iter());
    blob
}

/// A line or polygon object (`tag` is [`LINES_TAG`] or [`POLYGONS_TAG`])
/// made of `parts`.
pub fn parts_blob(tag: u32, parts: &[Vec<[f64; 2]>]) -> Vec<u8> {
    let total_points: usize = parts.iter().map(Vec::len).sum();
    let mut blob = vec![0u8; 48];
    blob[..4].copy_from_slice(&tag.to_le_bytes());
    blob[36..40].copy_from_slice(&(parts.len() as u32).to_le_bytes());
    blob[40..48].copy_from_slice(&(total_points as u64).to_le_bytes());
    let mut end = 0u32;
    for part in parts.iter().take(parts.len().saturating_sub(1)) {
        end += part.len() as u32;
        blob.extend_from_slice(&end.to_le_bytes());
    }
    push_coordinates(&mut blob, parts.iter().flatten());
    blob
}

fn push_coordinates<'a>(blob: &mut Vec<u8>, coords: impl Iterator<Item = &'a [f64; 2]>) {
    for [lng, lat] in coords {
        blob.extend_from_slice(&lng.to_le_bytes());
        blob.extend_from_slice(&lat.to_le_bytes());
    }
}

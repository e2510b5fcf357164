//! Decoding of `SpatialObj` blobs into GeoJSON geometries.

pub mod decoder;
pub mod geojson;
pub mod geometry;

pub use decoder::decode;
pub use geojson::to_geojson;
pub use geometry::{Coordinate, Geometry};

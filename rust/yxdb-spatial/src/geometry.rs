use serde::Serialize;

/// A `[longitude, latitude]` pair.
pub type Coordinate = [f64; 2];

/// A decoded spatial object, serialized with GeoJSON's `type`/`coordinates`
/// layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coordinate),
    MultiPoint(Vec<Coordinate>),
    LineString(Vec<Coordinate>),
    MultiLineString(Vec<Vec<Coordinate>>),
    /// Rings of a single polygon; the first is the outer ring.
    Polygon(Vec<Vec<Coordinate>>),
    /// Multi-part polygons are stored as one polygon with several rings.
    MultiPolygon(Vec<Vec<Vec<Coordinate>>>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_point() {
        let point = Geometry::Point([-96.679688, 37.230328]);
        assert_eq!(
            serde_json::to_string(&point).unwrap(),
            r#"{"type":"Point","coordinates":[-96.679688,37.230328]}"#
        );
    }

    #[test]
    fn test_serialize_multi_polygon_nesting() {
        let ring = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]];
        let geometry = Geometry::MultiPolygon(vec![vec![ring.clone(), ring]]);
        assert_eq!(
            serde_json::to_string(&geometry).unwrap(),
            r#"{"type":"MultiPolygon","coordinates":[[[[0.0,0.0],[1.0,0.0],[0.0,0.0]],[[0.0,0.0],[1.0,0.0],[0.0,0.0]]]]}"#
        );
    }
}

use geo::{Bearing, Distance, Geodesic, Haversine, Point};
use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};

use super::catalog::Direction;

/// Haversine distance in meters between two WGS84 coordinates.
pub fn haversine(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    Haversine::distance(Point::new(x1, y1), Point::new(x2, y2))
}

/// Compass direction of travel from point `a` to point `b`.
///
/// The geodesic bearing is quantized to the four cardinal labels used by the
/// zone lists: bearings within 45 degrees of due north are Northbound, and so
/// on around the compass.
pub fn compass_direction(a: Point, b: Point) -> Direction {
    let bearing = Geodesic::bearing(a, b);
    let normalized_bearing = (bearing + 360.0) % 360.0;
    match normalized_bearing {
        b if b < 45.0 => Direction::Northbound,
        b if b < 135.0 => Direction::Eastbound,
        b if b < 225.0 => Direction::Southbound,
        b if b < 315.0 => Direction::Westbound,
        _ => Direction::Northbound,
    }
}

/// Vertex of a line's coordinate sequence, stored in an R*-tree for
/// nearest-vertex queries.
pub struct VertexNode {
    envelope: AABB<[f64; 2]>,
    pub index: usize,
}

impl RTreeObject for VertexNode {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PointDistance for VertexNode {
    fn distance_2(&self, point: &<Self::Envelope as Envelope>::Point) -> f64 {
        self.envelope.distance_2(point)
    }
}

/// Index the vertices of a line for nearest-vertex lookups.
pub fn vertex_tree(coords: &[[f64; 2]]) -> RTree<VertexNode> {
    RTree::bulk_load(
        coords
            .iter()
            .enumerate()
            .map(|(index, coord)| VertexNode {
                envelope: AABB::from_point(*coord),
                index,
            })
            .collect(),
    )
}

/// Index of the vertex nearest to `point`, or None for an empty line.
pub fn nearest_vertex(tree: &RTree<VertexNode>, point: Point) -> Option<usize> {
    tree.nearest_neighbor(&[point.x(), point.y()])
        .map(|node| node.index)
}

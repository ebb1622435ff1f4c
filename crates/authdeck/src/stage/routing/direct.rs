use crate::stage::geometry::{
    Axis, dominant_axis, point_at_distance, polyline_length, resolve_anchors, simplify_orthogonal,
};
use crate::stage::types::{NodeBox, Point};

use super::types::{ComputedRoute, RouteKind};

/// Elbow route between the resolved anchors.
///
/// Horizontal edges run out to the midpoint x, jog to the target's row and
/// run in; vertical edges mirror that through the midpoint y. When the
/// anchors line up the jog vanishes and the route is a single segment.
pub fn route_direct(edge_id: &str, from: &NodeBox, to: &NodeBox) -> ComputedRoute {
    let axis = dominant_axis(from, to);
    let (a, b) = resolve_anchors(from, to);

    let raw = match axis {
        Axis::Horizontal => {
            let mx = (a.x + b.x) / 2.0;
            [a, Point::new(mx, a.y), Point::new(mx, b.y), b]
        }
        Axis::Vertical => {
            let my = (a.y + b.y) / 2.0;
            [a, Point::new(a.x, my), Point::new(b.x, my), b]
        }
    };
    let mut points = simplify_orthogonal(&raw);
    if points.len() < 2 {
        // Touching anchors still need a drawable segment.
        points = vec![a, b];
    }
    let label_anchor = point_at_distance(&points, polyline_length(&points) / 2.0);

    ComputedRoute {
        edge_id: edge_id.to_string(),
        points,
        label_anchor,
        kind: RouteKind::Direct(axis),
    }
}

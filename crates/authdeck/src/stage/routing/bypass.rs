use crate::stage::geometry::{Anchor, Axis, anchor_point, segment_crosses_box};
use crate::stage::types::{BoxMap, EdgeSpec, NodeBox, Point};

use super::types::{BypassSide, ComputedRoute, RouteKind, RoutingConfig};

/// Other nodes whose centre lies strictly between the endpoint centres on
/// `axis`. Returned in id order.
pub fn find_obstructions<'a>(
    boxes: &'a BoxMap,
    edge: &EdgeSpec,
    axis: Axis,
) -> Vec<(&'a str, NodeBox)> {
    let (Some(from), Some(to)) = (boxes.get(&edge.from), boxes.get(&edge.to)) else {
        return Vec::new();
    };
    let coord = |b: &NodeBox| match axis {
        Axis::Horizontal => b.center().x,
        Axis::Vertical => b.center().y,
    };
    let (a, b) = (coord(from), coord(to));
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };

    boxes
        .iter()
        .filter(|(id, _)| **id != edge.from && **id != edge.to)
        .filter(|(_, rect)| {
            let c = coord(rect);
            c > lo && c < hi
        })
        .map(|(id, rect)| (id.as_str(), *rect))
        .collect()
}

/// Which side a bypass takes, decided only by the sign of the travel
/// direction on the dominant axis.
pub fn bypass_side(from: &NodeBox, to: &NodeBox, axis: Axis) -> BypassSide {
    let a = from.center();
    let b = to.center();
    match axis {
        Axis::Horizontal if b.x - a.x > 0.0 => BypassSide::Above,
        Axis::Horizontal => BypassSide::Below,
        Axis::Vertical if b.y - a.y > 0.0 => BypassSide::Left,
        Axis::Vertical => BypassSide::Right,
    }
}

/// Route around `obstructions` on the side chosen by [`bypass_side`].
///
/// Each end leaves through the face looking at the bypass line. When an
/// obstruction sits in that exit column, the end leaves through its outer
/// face instead and jogs past every involved box before turning onto the
/// line, so the path stays clear of all obstructions.
pub fn route_bypass(
    edge_id: &str,
    from: &NodeBox,
    to: &NodeBox,
    obstructions: &[(&str, NodeBox)],
    axis: Axis,
    config: &RoutingConfig,
) -> ComputedRoute {
    let side = bypass_side(from, to, axis);
    let involved = || {
        [*from, *to]
            .into_iter()
            .chain(obstructions.iter().map(|(_, rect)| *rect))
    };
    let pad = config.bypass_padding;
    let lift = config.label_lift;

    let line = match side {
        BypassSide::Above => involved().map(|b| b.top()).fold(f32::INFINITY, f32::min) - pad,
        BypassSide::Below => {
            involved()
                .map(|b| b.bottom())
                .fold(f32::NEG_INFINITY, f32::max)
                + pad
        }
        BypassSide::Left => involved().map(|b| b.left()).fold(f32::INFINITY, f32::min) - pad,
        BypassSide::Right => {
            involved()
                .map(|b| b.right())
                .fold(f32::NEG_INFINITY, f32::max)
                + pad
        }
    };

    let mut points = exit_leg(from, to, obstructions, side, line, pad);
    let mut tail = exit_leg(to, from, obstructions, side, line, pad);
    tail.reverse();
    let a = points.last().copied().unwrap_or_default();
    let b = tail.first().copied().unwrap_or_default();
    points.extend(tail);

    let label_anchor = match side {
        BypassSide::Above | BypassSide::Below => Point::new((a.x + b.x) / 2.0, line - lift),
        BypassSide::Left => Point::new(line - lift, (a.y + b.y) / 2.0),
        BypassSide::Right => Point::new(line + lift, (a.y + b.y) / 2.0),
    };

    ComputedRoute {
        edge_id: edge_id.to_string(),
        points,
        label_anchor,
        kind: RouteKind::Bypass {
            side,
            obstructions: obstructions.len(),
        },
    }
}

/// Path from `end` to the bypass `line`, starting on the box.
fn exit_leg(
    end: &NodeBox,
    other: &NodeBox,
    obstructions: &[(&str, NodeBox)],
    side: BypassSide,
    line: f32,
    pad: f32,
) -> Vec<Point> {
    let face = match side {
        BypassSide::Above => Anchor::North,
        BypassSide::Below => Anchor::South,
        BypassSide::Left => Anchor::West,
        BypassSide::Right => Anchor::East,
    };
    let start = anchor_point(end, face);
    let on_line = match side {
        BypassSide::Above | BypassSide::Below => Point::new(start.x, line),
        BypassSide::Left | BypassSide::Right => Point::new(line, start.y),
    };
    let blocked = obstructions
        .iter()
        .any(|(_, rect)| segment_crosses_box(start, on_line, rect));
    if !blocked {
        return vec![start, on_line];
    }

    // Jog outward past every box, away from the other end.
    let boxes = || {
        [*end, *other]
            .into_iter()
            .chain(obstructions.iter().map(|(_, rect)| *rect))
    };
    let (c, o) = (end.center(), other.center());
    match side {
        BypassSide::Above | BypassSide::Below => {
            let (face, x) = if o.x > c.x {
                let x = boxes().map(|b| b.left()).fold(f32::INFINITY, f32::min) - pad;
                (Anchor::West, x)
            } else {
                let x = boxes().map(|b| b.right()).fold(f32::NEG_INFINITY, f32::max) + pad;
                (Anchor::East, x)
            };
            let start = anchor_point(end, face);
            vec![start, Point::new(x, start.y), Point::new(x, line)]
        }
        BypassSide::Left | BypassSide::Right => {
            let (face, y) = if o.y > c.y {
                let y = boxes().map(|b| b.top()).fold(f32::INFINITY, f32::min) - pad;
                (Anchor::North, y)
            } else {
                let y = boxes().map(|b| b.bottom()).fold(f32::NEG_INFINITY, f32::max) + pad;
                (Anchor::South, y)
            };
            let start = anchor_point(end, face);
            vec![start, Point::new(start.x, y), Point::new(line, y)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxes(entries: &[(&str, f32, f32)]) -> BoxMap {
        entries
            .iter()
            .map(|(id, x, y)| (id.to_string(), NodeBox::new(*x, *y, 100.0, 60.0)))
            .collect()
    }

    #[test]
    fn obstruction_requires_strictly_between_centre() {
        let map = boxes(&[("a", 0.0, 0.0), ("b", 300.0, 0.0), ("c", 600.0, 0.0)]);
        let edge = EdgeSpec::new("e", "a", "b");
        assert!(find_obstructions(&map, &edge, Axis::Horizontal).is_empty());

        let edge = EdgeSpec::new("e", "a", "c");
        let found = find_obstructions(&map, &edge, Axis::Horizontal);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "b");
    }

    #[test]
    fn obstruction_ignores_vertical_offset() {
        let map = boxes(&[("a", 0.0, 0.0), ("b", 300.0, 400.0), ("c", 600.0, 0.0)]);
        let edge = EdgeSpec::new("e", "c", "a");
        assert_eq!(find_obstructions(&map, &edge, Axis::Horizontal).len(), 1);
    }

    #[test]
    fn side_follows_direction_sign() {
        let a = NodeBox::new(0.0, 0.0, 100.0, 60.0);
        let b = NodeBox::new(600.0, 0.0, 100.0, 60.0);
        assert_eq!(bypass_side(&a, &b, Axis::Horizontal), BypassSide::Above);
        assert_eq!(bypass_side(&b, &a, Axis::Horizontal), BypassSide::Below);

        let c = NodeBox::new(0.0, 500.0, 100.0, 60.0);
        assert_eq!(bypass_side(&a, &c, Axis::Vertical), BypassSide::Left);
        assert_eq!(bypass_side(&c, &a, Axis::Vertical), BypassSide::Right);
    }
}
